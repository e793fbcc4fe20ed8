//! Per-format field mapping tables.
//!
//! Each canonical field lists the upstream keys that may carry it, in
//! priority order; the first key present on a record wins. Supporting a new
//! upstream spelling is a table edit.

use parkwatch_core::PayloadFormat;

pub(super) struct FieldMap {
    pub name: &'static [&'static str],
    pub lat: &'static [&'static str],
    pub lon: &'static [&'static str],
    /// Numeric count of free spaces; decides occupancy when present.
    pub available: &'static [&'static str],
    /// Textual status such as `目前空格`.
    pub remark: &'static [&'static str],
    /// Space category code; [`ACCESSIBLE_SPACE_TYPE`] marks accessible spaces.
    pub space_type: &'static [&'static str],
    pub accessible_flag: &'static [&'static str],
    pub weekday_fee: &'static [&'static str],
    pub service_hours: &'static [&'static str],
    pub distance: &'static [&'static str],
    pub address: &'static [&'static str],
    pub wkt: &'static [&'static str],
}

pub(super) const ACCESSIBLE_SPACE_TYPE: f64 = 6.0;
pub(super) const REMARK_FREE: &str = "目前空格";
pub(super) const REMARK_OCCUPIED: &str = "目前有車停放";

const LEGACY_POI: FieldMap = FieldMap {
    name: &["parkName", "name", "ParkName", "Name"],
    lat: &["lat", "Lat", "latitude", "Latitude"],
    lon: &["lon", "Lon", "lng", "longitude", "Longitude"],
    available: &["availableSpaces", "AvailableSpaces", "empty_lots"],
    remark: &["remark", "Remark"],
    space_type: &["dataType", "DataType"],
    accessible_flag: &["isAccessible", "accessible", "isDisabled"],
    weekday_fee: &["payex", "Payex", "weekdayFee", "weekday_fee"],
    service_hours: &["servicetime", "serviceTime", "ServiceTime"],
    distance: &["distance", "Distance"],
    address: &["address", "Address"],
    wkt: &["wkt", "WKT"],
};

const RANGE_QUERY: FieldMap = FieldMap {
    name: &["name", "parkName", "ParkName", "Name"],
    lat: &["latitude", "Latitude", "lat", "Lat"],
    lon: &["longitude", "Longitude", "lon", "lng", "Lon"],
    available: &["availableSpaces", "AvailableSpaces", "available", "empty_lots"],
    remark: &["remark", "Remark", "status"],
    space_type: &["dataType", "DataType", "spaceType"],
    accessible_flag: &["isAccessible", "accessible", "isDisabled"],
    weekday_fee: &["weekdayRate", "WeekdayRate", "weekdayFee", "payex"],
    // The holiday rate fills the same display slot when no hours are sent.
    service_hours: &[
        "serviceTime",
        "serviceHours",
        "servicetime",
        "ServiceTime",
        "holidayRate",
        "HolidayRate",
    ],
    distance: &["distance", "Distance"],
    address: &["address", "Address"],
    wkt: &["wkt", "WKT"],
};

pub(super) fn field_map(format: PayloadFormat) -> &'static FieldMap {
    match format {
        PayloadFormat::LegacyPoi => &LEGACY_POI,
        PayloadFormat::RangeQuery => &RANGE_QUERY,
    }
}
