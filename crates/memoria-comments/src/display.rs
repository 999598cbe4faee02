//! Presentation helpers.

use std::fmt::Display;

use chrono::{DateTime, Local, Locale, TimeZone, Utc};

/// Shown when a comment has no creation timestamp yet.
pub const FECHA_PLACEHOLDER: &str = "Hace unos momentos";

/// Long-form Spanish date in the local time zone.
pub fn format_fecha(fecha: Option<DateTime<Utc>>) -> String {
    format_fecha_in(fecha, &Local)
}

/// Long-form Spanish date in `tz`, e.g. `15 de marzo de 2025, 14:30`.
pub fn format_fecha_in<Tz>(fecha: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match fecha {
        Some(fecha) => fecha
            .with_timezone(tz)
            .format_localized("%-d de %B de %Y, %H:%M", Locale::es_ES)
            .to_string(),
        None => FECHA_PLACEHOLDER.to_owned(),
    }
}
