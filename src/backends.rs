//! Backend registry and initialization
//!
//! A backend turns a backend string such as `dummy:controllers=A+B` into the
//! set of GPIO controllers the commands operate on.

use pinctl_core::gpio::ControllerSet;

/// Parsed backend string
#[derive(Debug, PartialEq, Eq)]
pub struct BackendParams {
    /// Backend name as given
    pub name: String,
    /// Key-value parameters, in the order given
    pub params: Vec<(String, String)>,
}

impl BackendParams {
    /// Borrowed view of the parameters for the backends' `parse_options`
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a backend string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_backend_params(s: &str) -> Result<BackendParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.push((key.to_string(), value.to_string()));
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

/// Open the controllers of a backend
pub fn open_backend(backend: &str) -> Result<ControllerSet, Box<dyn std::error::Error>> {
    let params = parse_backend_params(backend)?;
    log::debug!("Opening backend '{}' with {:?}", params.name, params.params);

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" | "emulator" => open_dummy(&params),

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" | "gpiochip" => open_linux_gpio(&params),

        _ => Err(format!(
            "Unknown backend: {} (available: {})",
            params.name,
            backend_names_short()
        )
        .into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &BackendParams) -> Result<ControllerSet, Box<dyn std::error::Error>> {
    let controllers = pinctl_dummy::open_dummy(&params.options())
        .map_err(|e| format!("Invalid dummy parameters: {}", e))?;
    log::info!("Using emulated controllers");
    Ok(controllers)
}

#[cfg(feature = "linux-gpio")]
fn open_linux_gpio(params: &BackendParams) -> Result<ControllerSet, Box<dyn std::error::Error>> {
    log::info!("Opening Linux GPIO controllers...");

    pinctl_linux_gpio::open_linux_gpio(&params.options()).map_err(|e| {
        format!(
            "Failed to open Linux GPIO controllers: {}\n\
             Make sure the device exists and you have read/write permissions.\n\
             You may need to: sudo usermod -aG gpio $USER",
            e
        )
        .into()
    })
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory GPIO emulator (controllers=<A+B>,lines=<n>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpiochip"],
        description: "Linux GPIO character devices (dev=/dev/gpiochipN or gpiochip=N)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    if backends.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}
