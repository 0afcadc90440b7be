use sqlbench_core::configuration::Configuration;

/// Get the full version of the program (e.g. "sqlbench/0.1.0 Fedora/41.0.0/x86_64").
pub fn full_version(configuration: &Configuration) -> String {
    let program_name = &configuration.program_name;
    let version = &configuration.version;
    let info = os_info::get();
    let os = format!("{}", info.os_type()).replace(' ', "-");
    let os_version = info.version();
    let architecture = info.architecture().unwrap_or("unknown");

    format!("{program_name}/{version} {os}/{os_version}/{architecture}")
}
