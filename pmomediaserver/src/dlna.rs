//! Chaînes DLNA : flags de contenu, protocolInfo, durées

use std::fmt;

/// protocolInfo figé de la vignette, quel que soit l'encodage réel
pub const JPEG_THUMBNAIL_PROTOCOL_INFO: &str = "http-get:*:image/jpeg:DLNA.ORG_PN=JPEG_TN";

/// Champ 4 d'un protocolInfo (`DLNA.ORG_*`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFeatures {
    pub profile_name: Option<String>,
    pub support_time_seek: bool,
    pub support_range: bool,
    pub transcoded: bool,
}

impl ContentFeatures {
    /// Média servi tel quel, avec seek par plage d'octets
    pub fn streaming() -> Self {
        Self {
            support_range: true,
            ..Default::default()
        }
    }

    /// `http-get:*:<mime>:<features>`
    pub fn protocol_info(&self, mime: &str) -> String {
        format!("http-get:*:{}:{}", mime, self)
    }
}

impl fmt::Display for ContentFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pn) = &self.profile_name {
            write!(f, "DLNA.ORG_PN={};", pn)?;
        }
        write!(
            f,
            "DLNA.ORG_OP={}{};DLNA.ORG_CI={}",
            u8::from(self.support_time_seek),
            u8::from(self.support_range),
            u8::from(self.transcoded)
        )
    }
}

/// Durée en secondes vers `H:MM:SS[.fffffffff]`, zéros de fin retirés
///
/// `None` pour une valeur négative ou non finie.
pub fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let total_nanos = (seconds * 1e9).round() as u128;
    let nanos = (total_nanos % 1_000_000_000) as u32;
    let total_secs = total_nanos / 1_000_000_000;
    let (h, m, s) = (total_secs / 3600, (total_secs / 60) % 60, total_secs % 60);

    let mut out = format!("{}:{:02}:{:02}", h, m, s);
    if nanos != 0 {
        let frac = format!("{:09}", nanos);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    Some(out)
}
