/// Application name, used for default directory names.
pub const APP_NAME: &str = "sprinter";

/// Environment variable overriding the directory that holds every namespace root.
pub const ROOT_ENV: &str = "SPRINTER_ROOT";

/// Directory name under the home directory used when `SPRINTER_ROOT` is unset.
pub const DEFAULT_ROOT_DIRNAME: &str = ".sprinter";

/// First line of every managed rc file.
pub const RC_HEADER: &str = "# sprinter environment rc file. Generated, edits inside marked blocks are overwritten.";

/// Override marker used for the shell files sprinter injects into.
pub const OVERRIDE_MARKER: &str = "SPRINTER_OVERRIDES";

/// Reserved manifest section holding environment-level settings.
pub const CONFIG_SECTION: &str = "config";

/// Shell files, relative to the home directory, that receive the activation hook.
pub const SHELL_FILES: &[&str] = &[".bash_profile", ".bashrc", ".profile"];
