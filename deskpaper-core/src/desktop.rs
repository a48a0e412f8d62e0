use std::fmt;

/// Desktop environments whose wallpaper setting we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEnvironment {
    Gnome,
    Cinnamon,
    Mate,
    Xfce,
    Kde,
    Lxde,
    Unknown,
}

impl DesktopEnvironment {
    /// Maps a session or desktop name to an environment.
    pub fn from_name(name: &str) -> Self {
        let session = name.trim().to_lowercase();

        match session.as_str() {
            "gnome" | "unity" | "budgie" | "budgie-desktop" | "pantheon" | "gnome-xorg"
            | "gnome-classic" => return Self::Gnome,
            "cinnamon" | "x-cinnamon" => return Self::Cinnamon,
            "mate" => return Self::Mate,
            "xfce" | "xfce4" => return Self::Xfce,
            "kde" | "plasma" | "plasmawayland" | "plasmax11" => return Self::Kde,
            "lxde" => return Self::Lxde,
            _ => {}
        }

        if session.contains("xfce") || session.starts_with("xubuntu") {
            Self::Xfce
        } else if session.starts_with("ubuntustudio") || session.starts_with("kubuntu") {
            Self::Kde
        } else if session.starts_with("ubuntu") {
            Self::Gnome
        } else if session.starts_with("lubuntu") {
            Self::Lxde
        } else {
            Self::Unknown
        }
    }

    /// Detects the running desktop from the session environment.
    pub fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn detect_with<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // XDG_CURRENT_DESKTOP may be a colon separated list ("ubuntu:GNOME")
        if let Some(current) = var("XDG_CURRENT_DESKTOP") {
            for part in current.split(':') {
                let de = Self::from_name(part);
                if de != Self::Unknown {
                    return de;
                }
            }
        }

        if let Some(session) = var("DESKTOP_SESSION") {
            let de = Self::from_name(&session);
            if de != Self::Unknown {
                return de;
            }
        }

        if var("KDE_FULL_SESSION").unwrap_or_default() == "true" {
            return Self::Kde;
        }

        if var("GNOME_DESKTOP_SESSION_ID").is_some() {
            return Self::Gnome;
        }

        Self::Unknown
    }
}

impl fmt::Display for DesktopEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gnome => "gnome",
            Self::Cinnamon => "cinnamon",
            Self::Mate => "mate",
            Self::Xfce => "xfce4",
            Self::Kde => "kde",
            Self::Lxde => "lxde",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DesktopEnvironment::from_name("GNOME"), DesktopEnvironment::Gnome);
        assert_eq!(DesktopEnvironment::from_name("xubuntu"), DesktopEnvironment::Xfce);
        assert_eq!(DesktopEnvironment::from_name("kubuntu"), DesktopEnvironment::Kde);
        assert_eq!(DesktopEnvironment::from_name("ubuntu"), DesktopEnvironment::Gnome);
        assert_eq!(DesktopEnvironment::from_name("X-Cinnamon"), DesktopEnvironment::Cinnamon);
        assert_eq!(DesktopEnvironment::from_name("sway"), DesktopEnvironment::Unknown);
    }

    #[test]
    fn test_detect_prefers_xdg_current_desktop() {
        let de = DesktopEnvironment::detect_with(env(&[
            ("XDG_CURRENT_DESKTOP", "ubuntu:GNOME"),
            ("DESKTOP_SESSION", "plasma"),
        ]));
        assert_eq!(de, DesktopEnvironment::Gnome);
    }

    #[test]
    fn test_detect_falls_back_to_session_flags() {
        assert_eq!(
            DesktopEnvironment::detect_with(env(&[("KDE_FULL_SESSION", "true")])),
            DesktopEnvironment::Kde
        );
        assert_eq!(
            DesktopEnvironment::detect_with(env(&[("GNOME_DESKTOP_SESSION_ID", "this-is-deprecated")])),
            DesktopEnvironment::Gnome
        );
        assert_eq!(DesktopEnvironment::detect_with(env(&[])), DesktopEnvironment::Unknown);
    }

    #[test]
    fn test_display_round_trips_through_from_name() {
        for de in [
            DesktopEnvironment::Gnome,
            DesktopEnvironment::Cinnamon,
            DesktopEnvironment::Mate,
            DesktopEnvironment::Xfce,
            DesktopEnvironment::Kde,
            DesktopEnvironment::Lxde,
        ] {
            assert_eq!(DesktopEnvironment::from_name(&de.to_string()), de);
        }
    }
}
