//! Built-in logo shapes, embedded as SVG silhouettes.

/// Logo used when nothing better is known.
pub const DEFAULT: &str = "tux";

const BUILTIN: &[(&str, &[u8])] = &[
    ("tux", include_bytes!("../assets/logos/tux.svg")),
    ("arch", include_bytes!("../assets/logos/arch.svg")),
    ("debian", include_bytes!("../assets/logos/debian.svg")),
    ("ubuntu", include_bytes!("../assets/logos/ubuntu.svg")),
    ("fedora", include_bytes!("../assets/logos/fedora.svg")),
    ("apple", include_bytes!("../assets/logos/apple.svg")),
    ("terminal", include_bytes!("../assets/logos/terminal.svg")),
];

/// SVG bytes for a built-in logo name.
#[must_use]
pub fn builtin(name: &str) -> Option<&'static [u8]> {
    let name = name.to_ascii_lowercase();
    BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, bytes)| *bytes)
}

/// All built-in logo names, for `--help` and error messages.
#[must_use]
pub fn names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(n, _)| *n).collect()
}

/// Map an os-release distro id to a built-in logo name.
///
/// Unknown ids fall back to tux; derivatives map to their parent's logo.
#[must_use]
pub fn for_distro(id: &str) -> &'static str {
    match id {
        "arch" | "archlinux" | "manjaro" | "endeavouros" => "arch",
        "debian" => "debian",
        "ubuntu" | "linuxmint" | "pop" | "elementary" => "ubuntu",
        "fedora" | "rhel" | "centos" | "rocky" | "almalinux" => "fedora",
        "macos" | "darwin" => "apple",
        _ => DEFAULT,
    }
}
