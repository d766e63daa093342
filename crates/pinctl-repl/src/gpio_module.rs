//! GPIO module for Steel Scheme
//!
//! Pins are kept in a [`PinTable`] shared with the registered closures and
//! handed to Scheme code as small integer handles. Binding the same line of
//! the same controller again yields the same handle, so the table is bounded
//! by the number of lines. The variadic surface
//! (`pin`, `pin-init`, `pin-value`, `pin-call`) is defined in [`PRELUDE`] on
//! top of fixed-arity builtins that receive the optional arguments as a list.

use pinctl_core::gpio::{ControllerSet, Direction, Pull};
use pinctl_core::{Error, Pin, PinConfig};
use std::sync::{Arc, Mutex, MutexGuard};
use steel::rvals::SteelVal;
use steel::steel_vm::builtin::BuiltInModule;
use steel::steel_vm::register_fn::RegisterFn;

/// Scheme definitions loaded after the builtin modules
pub const PRELUDE: &str = r#"
(require-builtin pinctl/gpio)
(require-builtin pinctl/pin)

(define (pin name line . opts) (pin-make name line opts))
(define (pin-init p . opts) (pin-configure p opts))
(define (pin-value p . args) (pin-dispatch p args))
(define (pin-call p . args) (pin-dispatch p args))
"#;

/// Identifiers offered for completion and highlighted in the REPL
pub const VOCABULARY: &[&str] = &[
    "pin",
    "pin-init",
    "pin-value",
    "pin-call",
    "pin-low",
    "pin-high",
    "pin->string",
    "pin-line",
    "pin-controller",
    "gpio-controllers",
    "pinctl-help",
    "IN",
    "OUT",
    "PULL_UP",
    "PULL_DOWN",
];

/// Controllers shared by every session for the rest of the process
pub type Controllers = &'static ControllerSet;

/// Shared pin table
pub type SharedPins = Arc<Mutex<PinTable>>;

/// Pins created by a scripting session, indexed by handle
#[derive(Default)]
pub struct PinTable {
    pins: Vec<Pin<'static>>,
}

impl PinTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pin and return its handle
    ///
    /// A pin on a line that is already in the table reuses its handle.
    pub fn insert(&mut self, pin: Pin<'static>) -> usize {
        let existing = self.pins.iter().position(|p| {
            p.line() == pin.line() && p.controller().name() == pin.controller().name()
        });
        if let Some(idx) = existing {
            return idx;
        }
        self.pins.push(pin);
        self.pins.len() - 1
    }

    /// Resolve a handle coming from Scheme
    pub fn get(&self, handle: isize) -> Result<Pin<'static>, String> {
        usize::try_from(handle)
            .ok()
            .and_then(|idx| self.pins.get(idx))
            .copied()
            .ok_or_else(|| format!("no pin with handle {}", handle))
    }

    /// Number of distinct pins bound so far
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// True if no pin was created yet
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

/// An optional argument after keyword splitting
#[derive(Debug, Clone)]
pub enum Arg {
    /// `'name` marker introducing a keyword argument
    Keyword(String),
    /// Any other value
    Value(SteelVal),
}

impl From<SteelVal> for Arg {
    fn from(val: SteelVal) -> Self {
        match val {
            SteelVal::SymbolV(name) => Arg::Keyword(name.to_string()),
            other => Arg::Value(other),
        }
    }
}

/// Scheme truthiness as applied to pin levels
///
/// `#f`, zero, void and the empty list are low; anything else is high.
pub fn is_high(val: &SteelVal) -> bool {
    match val {
        SteelVal::BoolV(b) => *b,
        SteelVal::IntV(i) => *i != 0,
        SteelVal::NumV(n) => *n != 0.0,
        SteelVal::Void => false,
        SteelVal::ListV(items) => items.iter().next().is_some(),
        _ => true,
    }
}

fn steel_to_args(val: SteelVal) -> Result<Vec<Arg>, String> {
    match val {
        SteelVal::ListV(items) => Ok(items.iter().cloned().map(Arg::from).collect()),
        SteelVal::Void => Ok(Vec::new()),
        _ => Err("expected argument list".to_string()),
    }
}

fn raw_u32(val: &SteelVal, what: &str) -> Result<u32, String> {
    match val {
        SteelVal::IntV(i) => u32::try_from(*i).map_err(|_| format!("{} out of range: {}", what, i)),
        other => Err(format!("{} must be an integer, got {}", what, other)),
    }
}

fn parse_mode(val: &SteelVal) -> Result<Direction, String> {
    Direction::from_raw(raw_u32(val, "mode")?).map_err(|e| e.to_string())
}

fn parse_pull(val: &SteelVal) -> Result<Pull, String> {
    match val {
        SteelVal::BoolV(false) | SteelVal::Void => Ok(Pull::None),
        other => Pull::from_raw(raw_u32(other, "pull")?).map_err(|e| e.to_string()),
    }
}

/// Bind `[mode [pull]] ['mode m] ['pull p] ['value v]` to a configuration
///
/// Returns `None` when no option at all was given. Positional options must
/// come before keywords and each option may be given once.
pub fn parse_config(args: &[Arg]) -> Result<Option<PinConfig>, String> {
    const POSITIONAL: [&str; 2] = ["mode", "pull"];

    let mut slots: [Option<&SteelVal>; 3] = [None; 3];
    let slot_index = |name: &str| match name {
        "mode" => Some(0),
        "pull" => Some(1),
        "value" => Some(2),
        _ => None,
    };

    let mut positional = 0;
    let mut iter = args.iter();
    let mut seen_keyword = false;

    while let Some(arg) = iter.next() {
        match arg {
            Arg::Value(val) => {
                if seen_keyword {
                    return Err("positional argument follows keyword argument".to_string());
                }
                if positional == POSITIONAL.len() {
                    return Err(format!(
                        "function takes at most {} positional arguments ({} given)",
                        POSITIONAL.len(),
                        args.iter().take_while(|a| matches!(a, Arg::Value(_))).count()
                    ));
                }
                slots[positional] = Some(val);
                positional += 1;
            }
            Arg::Keyword(name) => {
                seen_keyword = true;
                let idx = slot_index(name)
                    .ok_or_else(|| format!("unexpected keyword argument '{}'", name))?;
                let Some(Arg::Value(val)) = iter.next() else {
                    return Err(format!("keyword '{}' needs a value", name));
                };
                if slots[idx].is_some() {
                    return Err(format!("argument '{}' given more than once", name));
                }
                slots[idx] = Some(val);
            }
        }
    }

    let [mode, pull, value] = slots;
    if mode.is_none() && pull.is_none() && value.is_none() {
        return Ok(None);
    }

    let mode = mode.ok_or_else(|| "'mode' argument required".to_string())?;
    let mut config = PinConfig::new(parse_mode(mode)?);
    if let Some(pull) = pull {
        config = config.with_pull(parse_pull(pull)?);
    }
    if let Some(value) = value {
        config = config.with_value(is_high(value));
    }
    Ok(Some(config))
}

fn lock(pins: &SharedPins) -> Result<MutexGuard<'_, PinTable>, String> {
    pins.lock().map_err(|e| format!("lock error: {}", e))
}

fn pin_error(op: &str, e: Error) -> String {
    format!("{}: {}", op, e)
}

/// Construct a pin, configuring it when options are present
pub fn pin_make(
    controllers: Controllers,
    pins: &SharedPins,
    name: &str,
    line: isize,
    opts: Vec<Arg>,
) -> Result<isize, String> {
    let line = u32::try_from(line).map_err(|_| format!("pin: invalid line {}", line))?;
    let config = parse_config(&opts).map_err(|e| format!("pin: {}", e))?;

    let pin = match config {
        Some(config) => Pin::with_config(controllers, name, line, &config),
        None => Pin::new(controllers, name, line),
    }
    .map_err(|e| pin_error("pin", e))?;

    let handle = lock(pins)?.insert(pin);
    log::debug!("repl: {} -> handle {}", pin, handle);
    Ok(handle as isize)
}

/// Reconfigure an existing pin
pub fn pin_configure(pins: &SharedPins, handle: isize, opts: Vec<Arg>) -> Result<SteelVal, String> {
    let pin = lock(pins)?.get(handle)?;
    let config = parse_config(&opts)
        .map_err(|e| format!("pin-init: {}", e))?
        .ok_or_else(|| "pin-init: 'mode' argument required".to_string())?;
    pin.init(&config).map_err(|e| pin_error("pin-init", e))?;
    Ok(SteelVal::Void)
}

/// Call-sugar dispatch: no argument reads, one argument writes
pub fn pin_dispatch(pins: &SharedPins, handle: isize, args: &[SteelVal]) -> Result<SteelVal, String> {
    let pin = lock(pins)?.get(handle)?;
    let levels: Vec<bool> = args.iter().map(is_high).collect();
    match pin.call(&levels).map_err(|e| pin_error("pin-value", e))? {
        Some(level) => Ok(SteelVal::IntV(level as isize)),
        None => Ok(SteelVal::Void),
    }
}

fn pin_write(pins: &SharedPins, handle: isize, level: bool) -> Result<SteelVal, String> {
    let pin = lock(pins)?.get(handle)?;
    let op = if level { "pin-high" } else { "pin-low" };
    pin.write(level).map_err(|e| pin_error(op, e))?;
    Ok(SteelVal::Void)
}

/// Create the GPIO module bound to a controller set and pin table
pub fn create_gpio_module(controllers: Controllers, pins: SharedPins) -> BuiltInModule {
    let mut module = BuiltInModule::new("pinctl/gpio");

    let p = Arc::clone(&pins);
    module.register_fn(
        "pin-make",
        move |name: String, line: isize, opts: SteelVal| -> Result<isize, String> {
            pin_make(controllers, &p, &name, line, steel_to_args(opts)?)
        },
    );

    let p = Arc::clone(&pins);
    module.register_fn(
        "pin-configure",
        move |handle: isize, opts: SteelVal| -> Result<SteelVal, String> {
            pin_configure(&p, handle, steel_to_args(opts)?)
        },
    );

    let p = Arc::clone(&pins);
    module.register_fn(
        "pin-dispatch",
        move |handle: isize, args: SteelVal| -> Result<SteelVal, String> {
            let args = match args {
                SteelVal::ListV(items) => items.iter().cloned().collect::<Vec<_>>(),
                _ => return Err("pin-value: expected argument list".to_string()),
            };
            pin_dispatch(&p, handle, &args)
        },
    );

    let p = Arc::clone(&pins);
    module.register_fn("pin-low", move |handle: isize| pin_write(&p, handle, false));

    let p = Arc::clone(&pins);
    module.register_fn("pin-high", move |handle: isize| pin_write(&p, handle, true));

    let p = Arc::clone(&pins);
    module.register_fn("pin->string", move |handle: isize| -> Result<String, String> {
        Ok(lock(&p)?.get(handle)?.to_string())
    });

    let p = Arc::clone(&pins);
    module.register_fn("pin-line", move |handle: isize| -> Result<isize, String> {
        Ok(lock(&p)?.get(handle)?.line() as isize)
    });

    let p = Arc::clone(&pins);
    module.register_fn("pin-controller", move |handle: isize| -> Result<String, String> {
        Ok(lock(&p)?.get(handle)?.controller().name().to_string())
    });

    module.register_fn("gpio-controllers", move || -> SteelVal {
        SteelVal::ListV(
            controllers
                .names()
                .map(|name| SteelVal::StringV(name.into()))
                .collect(),
        )
    });

    // Named pinctl-help to avoid Steel's built-in help
    module.register_fn("pinctl-help", || {
        print_help();
        SteelVal::Void
    });

    module
}

/// Create the pin constants module
pub fn create_constants_module() -> BuiltInModule {
    let mut module = BuiltInModule::new("pinctl/pin");

    module.register_value("IN", SteelVal::IntV(Pin::IN as isize));
    module.register_value("OUT", SteelVal::IntV(Pin::OUT as isize));
    module.register_value("PULL_UP", SteelVal::IntV(Pin::PULL_UP as isize));
    module.register_value("PULL_DOWN", SteelVal::IntV(Pin::PULL_DOWN as isize));

    module
}

fn print_help() {
    println!(
        r#"
pinctl Scheme REPL - Available Commands
=======================================

PINS
----
(pin name line)                      Bind a line without touching it.
(pin name line mode [pull])          Bind and configure.
(pin name line mode 'value v)        Bind, configure, then drive v.
    Options may also be given as keywords: 'mode m 'pull p 'value v.
    Positional options come first. A pull of #f means no pull.

(pin-init p mode [pull] ['value v])  Reconfigure a pin.
(pin-value p)                        Read the line level.
(pin-value p v)                      Drive the line (#f, 0 and '() are low).
(pin-call p [v])                     Same as pin-value.
(pin-low p)  (pin-high p)            Drive the line low / high.
(pin->string p)                      Printable form, e.g. "Pin(GPIO_0@4)".
(pin-line p)  (pin-controller p)     Accessors.
(gpio-controllers)                   Names of the available controllers.

CONSTANTS (from pinctl/pin module)
----------------------------------
IN, OUT, PULL_UP, PULL_DOWN

EXAMPLES
--------
> (define led (pin "GPIO_0" 4 OUT 'value #t))
> (pin-value led)
1
> (pin-low led)
> (define button (pin "GPIO_0" 5 IN PULL_UP))
> (pin-value button)
1

(quit) or (exit) to exit the REPL.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinctl_dummy::{dummy_controllers, DummyConfig};

    fn controllers() -> Controllers {
        Box::leak(Box::new(dummy_controllers(&DummyConfig::default())))
    }

    fn int(i: isize) -> Arg {
        Arg::Value(SteelVal::IntV(i))
    }

    fn kw(name: &str) -> Arg {
        Arg::Keyword(name.to_string())
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_high(&SteelVal::BoolV(false)));
        assert!(!is_high(&SteelVal::IntV(0)));
        assert!(!is_high(&SteelVal::Void));
        assert!(!is_high(&SteelVal::ListV(Vec::<SteelVal>::new().into_iter().collect())));
        assert!(is_high(&SteelVal::BoolV(true)));
        assert!(is_high(&SteelVal::IntV(7)));
        assert!(is_high(&SteelVal::ListV(
            vec![SteelVal::IntV(0)].into_iter().collect()
        )));
    }

    #[test]
    fn test_parse_config_empty() {
        assert_eq!(parse_config(&[]), Ok(None));
    }

    #[test]
    fn test_parse_config_positional() {
        let config = parse_config(&[int(Pin::OUT as isize), int(Pin::PULL_UP as isize)])
            .unwrap()
            .unwrap();
        assert_eq!(config.mode, Direction::Out);
        assert_eq!(config.pull, Pull::Up);
        assert_eq!(config.value, None);
    }

    #[test]
    fn test_parse_config_keywords() {
        let args = [
            int(Pin::OUT as isize),
            kw("value"),
            Arg::Value(SteelVal::BoolV(true)),
            kw("pull"),
            Arg::Value(SteelVal::BoolV(false)),
        ];
        let config = parse_config(&args).unwrap().unwrap();
        assert_eq!(config, PinConfig::output().with_value(true));
    }

    #[test]
    fn test_parse_config_errors() {
        // Three positional options
        assert!(parse_config(&[int(1), int(0), int(1)]).is_err());
        // Value without mode
        let err = parse_config(&[kw("value"), int(1)]).unwrap_err();
        assert!(err.contains("'mode'"));
        // Unknown keyword, missing keyword value, duplicate
        assert!(parse_config(&[int(1), kw("speed"), int(3)]).is_err());
        assert!(parse_config(&[int(1), kw("value")]).is_err());
        assert!(parse_config(&[int(1), kw("mode"), int(0)]).is_err());
        // Positional after keyword
        assert!(parse_config(&[kw("mode"), int(1), int(0)]).is_err());
        // Unknown encodings
        assert!(parse_config(&[int(5)]).is_err());
        assert!(parse_config(&[int(0), int(3)]).is_err());
        assert!(parse_config(&[int(-1)]).is_err());
    }

    #[test]
    fn test_pin_lifecycle() {
        let controllers = controllers();
        let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));

        let led = pin_make(
            controllers,
            &pins,
            "GPIO_0",
            4,
            vec![int(Pin::OUT as isize), kw("value"), int(1)],
        )
        .unwrap();

        let level = pin_dispatch(&pins, led, &[]).unwrap();
        assert!(matches!(level, SteelVal::IntV(1)));

        pin_write(&pins, led, false).unwrap();
        assert!(matches!(pin_dispatch(&pins, led, &[]).unwrap(), SteelVal::IntV(0)));

        pin_dispatch(&pins, led, &[SteelVal::BoolV(true)]).unwrap();
        assert!(matches!(pin_dispatch(&pins, led, &[]).unwrap(), SteelVal::IntV(1)));
        assert_eq!(lock(&pins).unwrap().get(led).unwrap().to_string(), "Pin(GPIO_0@4)");
    }

    #[test]
    fn test_pin_dispatch_arity() {
        let controllers = controllers();
        let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));
        let p = pin_make(controllers, &pins, "GPIO_1", 0, Vec::new()).unwrap();

        let err = pin_dispatch(&pins, p, &[SteelVal::IntV(1), SteelVal::IntV(0)]).unwrap_err();
        assert!(err.contains("at most 1 argument"));
    }

    #[test]
    fn test_pin_make_unknown_controller() {
        let controllers = controllers();
        let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));
        let err = pin_make(controllers, &pins, "nonexistent", 0, Vec::new()).unwrap_err();
        assert!(err.contains("invalid pin"));
        assert!(lock(&pins).unwrap().is_empty());
    }

    #[test]
    fn test_pin_configure_requires_mode() {
        let controllers = controllers();
        let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));
        let p = pin_make(controllers, &pins, "GPIO_0", 2, Vec::new()).unwrap();

        assert!(pin_configure(&pins, p, Vec::new()).is_err());
        assert!(pin_configure(&pins, p, vec![int(Pin::IN as isize)]).is_ok());
        assert!(pin_configure(&pins, p, vec![int(Pin::OUT as isize)]).is_ok());
    }

    #[test]
    fn test_rebinding_reuses_handle() {
        let controllers = controllers();
        let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));

        let a = pin_make(controllers, &pins, "GPIO_0", 7, Vec::new()).unwrap();
        for _ in 0..100 {
            let again = pin_make(controllers, &pins, "GPIO_0", 7, vec![int(Pin::IN as isize)]);
            assert_eq!(again, Ok(a));
        }
        let other_line = pin_make(controllers, &pins, "GPIO_0", 8, Vec::new()).unwrap();
        let other_ctrl = pin_make(controllers, &pins, "GPIO_1", 7, Vec::new()).unwrap();

        assert_ne!(other_line, a);
        assert_ne!(other_ctrl, a);
        assert_ne!(other_ctrl, other_line);
        assert_eq!(lock(&pins).unwrap().len(), 3);
    }

    #[test]
    fn test_bad_handle() {
        let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));
        assert!(pin_dispatch(&pins, 0, &[]).is_err());
        assert!(pin_dispatch(&pins, -3, &[]).is_err());
    }
}
