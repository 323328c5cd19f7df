//! Builtin presets, addressed as `builtin:<name>`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::config::schema::{AllowPath, Preset, PresetRules};

/// Namespace prefix for builtin presets.
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Writable locations for AI coding tools, editors and shell helpers.
const SECURE_ALLOW: &[&str] = &[
    ".",
    "$HOME/.local/share",
    "$HOME/.local/state",
    // AI coding tools
    "$HOME/.bun",
    "$HOME/.cache/opencode",
    "$HOME/.claude",
    "$HOME/.codeium",
    "$HOME/.cody",
    "$HOME/.config/aider",
    "$HOME/.config/claude",
    "$HOME/.config/opencode",
    "$HOME/.continue",
    "$HOME/.cursor",
    "$HOME/.tabby",
    // IDE/editor config
    "$HOME/.config/Code",
    "$HOME/.config/Cursor",
    "$HOME/.config/JetBrains",
    "$HOME/.config/VSCodium",
    "$HOME/.idea",
    "$HOME/.vscode",
    "$HOME/.vscode-server",
    // Shell tools
    "$HOME/.cache/starship",
];

/// System roots readable in strict mode.
const STRICT_BASE_READ: &[&str] = &[
    "/Applications",
    "/Library",
    "/System",
    "/bin",
    "/dev",
    "/etc",
    "/lib",
    "/lib64",
    "/opt",
    "/private/var",
    "/private/var/folders",
    "/proc",
    "/sbin",
    "/sys",
    "/usr",
    "/var",
    "$HOME/.config/fish",
];

/// Credentials, history and browser data.
const SECRETS_DENY: &[&str] = &[
    // SSH
    "$HOME/.ssh",
    // Cloud providers
    "$HOME/.aws",
    "$HOME/.azure",
    "$HOME/.config/gcloud",
    "$HOME/.config/doctl",
    "$HOME/.config/flyctl",
    "$HOME/.config/hcloud",
    "$HOME/.config/linode",
    "$HOME/.config/scaleway",
    // Containers and orchestration
    "$HOME/.kube",
    "$HOME/.docker/config.json",
    "$HOME/.helm",
    "$HOME/.config/containers",
    "$HOME/.lima/_config",
    "$HOME/.rd",
    "$HOME/.config/k3d",
    "$HOME/.config/Lens",
    "$HOME/.config/OpenLens",
    // CI/CD and deployment
    "$HOME/.config/vercel",
    "$HOME/.config/netlify",
    "$HOME/.config/railway",
    "$HOME/.config/heroku",
    "$HOME/.config/circleci",
    // Git forges
    "$HOME/.config/gh",
    "$HOME/.config/hub",
    "$HOME/.config/glab",
    "$HOME/.git-credentials",
    "$HOME/.netrc",
    // Encryption
    "$HOME/.gnupg",
    "$HOME/.config/sops/age",
    "$HOME/.config/op",
    // Package manager credentials
    "$HOME/.npmrc",
    "$HOME/.pypirc",
    "$HOME/.config/pip",
    "$HOME/.config/configstore",
    "$HOME/.cargo/credentials.toml",
    // Dev tools
    "$HOME/.config/snyk",
    "$HOME/.config/ngrok",
    // Shell history
    "$HOME/.bash_history",
    "$HOME/.zsh_history",
    "$HOME/.local/share/atuin",
    "$HOME/.local/share/fish/fish_history",
    "$HOME/.node_repl_history",
    "$HOME/.python_history",
    "$HOME/.psql_history",
    "$HOME/.mysql_history",
    "$HOME/.rediscli_history",
    // macOS
    "$HOME/Library",
    // Browsers
    "$HOME/.config/google-chrome",
    "$HOME/.config/chromium",
    "$HOME/.mozilla/firefox",
    "$HOME/.config/BraveSoftware",
];

const HOME_DOTFILES_DENY: &[&str] = &["$HOME/.*"];

const SAFE_HOME_READ: &[&str] = &[
    "/usr",
    "/bin",
    "/sbin",
    "/lib",
    "/lib64",
    "/etc",
    "/opt",
    "/var",
    "/dev",
    "/proc",
    "/sys",
    "/System",
    "/Library",
    "/Applications",
    "/private/var/folders",
    "$HOME/Documents",
    "$HOME/Downloads",
    "$HOME/Desktop",
    "$HOME/Pictures",
    "$HOME/Music",
    "$HOME/Videos",
    "$HOME/Movies",
    "$HOME/Projects",
    "$HOME/Developer",
    "$HOME/Code",
    "$HOME/src",
    "$HOME/go/src",
    "$HOME/workspace",
];

const NPM_ALLOW: &[&str] = &[".", "$HOME/.npm", "$HOME/.cache/npm", "node_modules"];

const CARGO_ALLOW: &[&str] = &[".", "$HOME/.cargo", "$HOME/.rustup", "target"];

fn paths(list: &[&str]) -> Vec<AllowPath> {
    list.iter().map(|p| AllowPath::new(*p)).collect()
}

static BUILTIN_PRESETS: Lazy<BTreeMap<&'static str, Preset>> = Lazy::new(|| {
    let mut presets = BTreeMap::new();

    presets.insert(
        "secure",
        Preset {
            extends: vec![
                format!("{}strict-base", BUILTIN_PREFIX),
                format!("{}secrets-deny", BUILTIN_PREFIX),
            ],
            rules: PresetRules {
                allow: paths(SECURE_ALLOW),
                allow_git: true,
                ..Default::default()
            },
        },
    );
    presets.insert(
        "strict-base",
        Preset {
            rules: PresetRules {
                strict: true,
                read: paths(STRICT_BASE_READ),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    presets.insert(
        "secrets-deny",
        Preset {
            rules: PresetRules {
                deny: paths(SECRETS_DENY),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    presets.insert(
        "home-dotfiles-deny",
        Preset {
            rules: PresetRules {
                deny: paths(HOME_DOTFILES_DENY),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    presets.insert(
        "safe-home",
        Preset {
            rules: PresetRules {
                strict: true,
                read: paths(SAFE_HOME_READ),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    presets.insert(
        "npm",
        Preset {
            rules: PresetRules {
                allow: paths(NPM_ALLOW),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    presets.insert(
        "cargo",
        Preset {
            rules: PresetRules {
                allow: paths(CARGO_ALLOW),
                ..Default::default()
            },
            ..Default::default()
        },
    );

    presets
});

/// Look up a builtin preset by its unprefixed name.
pub fn builtin_preset(name: &str) -> Option<&'static Preset> {
    BUILTIN_PRESETS.get(name)
}

/// Unprefixed names of all builtin presets, sorted.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_PRESETS.keys().copied()
}
