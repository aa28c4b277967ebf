//! Field names used by the RKI feature layers.

/// Administrative unit id (mapping and key data).
pub const ADM_UNIT_ID: &str = "AdmUnitId";
/// Administrative unit display name (mapping).
pub const NAME: &str = "Name";
/// State id; 0 is the nationwide aggregate.
pub const BUNDESLAND_ID: &str = "BundeslandId";
/// Reporting date as epoch milliseconds (history).
pub const DATUM: &str = "Datum";
/// Cases reported on a date (history).
pub const ANZ_FALL_MELDUNG: &str = "AnzFallMeldung";
/// 7-day incidence per 100k (key data).
pub const INZ_7T: &str = "Inz7T";
/// Age bracket label (age groups).
pub const ALTERSGRUPPE: &str = "Altersgruppe";
/// Male cases (age groups).
pub const ANZ_FALL_M: &str = "AnzFallM";
/// Female cases (age groups).
pub const ANZ_FALL_W: &str = "AnzFallW";
