use serde_json::json;

use super::*;

fn raw(body: Value, format: PayloadFormat) -> RawPayload {
    RawPayload {
        source: "test".to_string(),
        format,
        body,
    }
}

// -----------------------------------------------------------------------
// legacy POI payloads
// -----------------------------------------------------------------------

#[test]
fn legacy_records_parse_string_coordinates_and_remark() {
    let body = json!([
        {"name": "City Lot 1", "lat": "25.03", "lon": "121.5", "remark": "目前空格", "dataType": 1},
        {"name": "City Lot 1", "lat": "25.03", "lon": "121.5", "remark": "目前有車停放", "dataType": 1}
    ]);
    let records = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name.as_deref(), Some("City Lot 1"));
    assert!((records[0].lat - 25.03).abs() < f64::EPSILON);
    assert!((records[0].lon - 121.5).abs() < f64::EPSILON);
    assert_eq!(records[0].occupancy, Occupancy::Free);
    assert_eq!(records[1].occupancy, Occupancy::Occupied);
    assert!(!records[0].is_accessible);
}

#[test]
fn legacy_prefers_park_name_and_maps_fee_fields() {
    let body = json!([{
        "parkName": "Zhongshan Garage",
        "name": "ignored",
        "lat": "25.05",
        "lon": "121.52",
        "remark": "目前空格",
        "payex": "30元/小時",
        "servicetime": "00:00~24:00"
    }]);
    let record = &try_normalize(&body, PayloadFormat::LegacyPoi).unwrap()[0];
    assert_eq!(record.name.as_deref(), Some("Zhongshan Garage"));
    assert_eq!(record.weekday_fee.as_deref(), Some("30元/小時"));
    assert_eq!(record.service_hours.as_deref(), Some("00:00~24:00"));
}

#[test]
fn data_type_six_marks_accessible_in_number_or_string_form() {
    let body = json!([
        {"name": "A", "lat": 25.0, "lon": 121.0, "dataType": 6},
        {"name": "B", "lat": 25.0, "lon": 121.0, "dataType": "6"},
        {"name": "C", "lat": 25.0, "lon": 121.0, "dataType": "1"},
        {"name": "D", "lat": 25.0, "lon": 121.0, "isAccessible": true}
    ]);
    let flags: Vec<bool> = try_normalize(&body, PayloadFormat::LegacyPoi)
        .unwrap()
        .iter()
        .map(|r| r.is_accessible)
        .collect();
    assert_eq!(flags, [true, true, false, true]);
}

#[test]
fn missing_or_unknown_remark_is_never_free() {
    let body = json!([
        {"name": "A", "lat": "25", "lon": "121"},
        {"name": "B", "lat": "25", "lon": "121", "remark": "維護中"},
        {"name": "C", "lat": "25", "lon": "121", "remark": null}
    ]);
    let records = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap();
    assert!(records.iter().all(|r| r.occupancy == Occupancy::Unknown));
    assert!(records.iter().all(ParkingRecord::is_occupied));
}

#[test]
fn unparsable_coordinates_default_to_zero() {
    let body = json!([
        {"name": "A", "lat": "north", "lon": null},
        {"name": "B", "lat": "NaN", "lon": "inf"}
    ]);
    for record in try_normalize(&body, PayloadFormat::LegacyPoi).unwrap() {
        assert!(record.lat.abs() < f64::EPSILON && record.lon.abs() < f64::EPSILON);
    }
}

#[test]
fn wkt_polygon_is_parsed_and_used_when_coordinates_are_missing() {
    let body = json!([{
        "parkName": "Curb 12",
        "remark": "目前空格",
        "wkt": "POLYGON ((121.50 25.00, 121.52 25.00, 121.52 25.02, 121.50 25.02))"
    }]);
    let record = &try_normalize(&body, PayloadFormat::LegacyPoi).unwrap()[0];
    assert_eq!(record.polygon.len(), 4);
    assert!((record.lat - 25.01).abs() < 1e-9);
    assert!((record.lon - 121.51).abs() < 1e-9);
}

#[test]
fn blank_names_become_none() {
    let body = json!([
        {"parkName": "   ", "lat": "25", "lon": "121"},
        {"lat": "25", "lon": "121"}
    ]);
    let records = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap();
    assert!(records.iter().all(|r| r.name.is_none()));
}

#[test]
fn non_object_entries_are_skipped() {
    let body = json!([1, "two", null, {"name": "Lot", "lat": "25", "lon": "121"}]);
    let records = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap();
    assert_eq!(records.len(), 1);
}

// -----------------------------------------------------------------------
// range-query payloads
// -----------------------------------------------------------------------

#[test]
fn available_count_decides_occupancy() {
    let body = json!([
        {"name": "Zero", "latitude": 25.0, "longitude": 121.0, "availableSpaces": 0},
        {"name": "Five", "latitude": 25.0, "longitude": 121.0, "availableSpaces": 5},
        {"name": "Str", "latitude": 25.0, "longitude": 121.0, "availableSpaces": "3"},
        {"name": "Neg", "latitude": 25.0, "longitude": 121.0, "availableSpaces": -9},
        {"name": "Bad", "latitude": 25.0, "longitude": 121.0, "availableSpaces": "n/a"}
    ]);
    let occ: Vec<Occupancy> = try_normalize(&body, PayloadFormat::RangeQuery)
        .unwrap()
        .iter()
        .map(|r| r.occupancy)
        .collect();
    assert_eq!(
        occ,
        [
            Occupancy::Occupied,
            Occupancy::Free,
            Occupancy::Free,
            Occupancy::Occupied,
            Occupancy::Unknown
        ]
    );
}

#[test]
fn count_takes_precedence_over_remark() {
    let body = json!([{"name": "Lot", "availableSpaces": 0, "remark": "目前空格"}]);
    let record = &try_normalize(&body, PayloadFormat::RangeQuery).unwrap()[0];
    assert_eq!(record.occupancy, Occupancy::Occupied);
}

#[test]
fn range_query_maps_pascal_case_and_distance() {
    let body = json!([{
        "ParkName": "Xinyi Plaza",
        "Latitude": "25.033",
        "Longitude": "121.565",
        "AvailableSpaces": 12,
        "totalSpaces": 40,
        "weekdayRate": "40/hr",
        "holidayRate": "60/hr",
        "distance": "350.5",
        "address": "No. 1, Songshou Rd"
    }]);
    let record = &try_normalize(&body, PayloadFormat::RangeQuery).unwrap()[0];
    assert_eq!(record.name.as_deref(), Some("Xinyi Plaza"));
    assert!((record.lat - 25.033).abs() < f64::EPSILON);
    assert_eq!(record.occupancy, Occupancy::Free);
    assert_eq!(record.weekday_fee.as_deref(), Some("40/hr"));
    assert_eq!(record.distance, Some(350.5));
    assert_eq!(record.address.as_deref(), Some("No. 1, Songshou Rd"));
    assert_eq!(record.service_hours.as_deref(), Some("60/hr"));
}

#[test]
fn range_query_service_hours_win_over_holiday_rate() {
    let body = json!([{
        "name": "Lot",
        "serviceTime": "07:00-22:00",
        "holidayRate": "60/hr"
    }]);
    let record = &try_normalize(&body, PayloadFormat::RangeQuery).unwrap()[0];
    assert_eq!(record.service_hours.as_deref(), Some("07:00-22:00"));
}

// -----------------------------------------------------------------------
// envelope and shape handling
// -----------------------------------------------------------------------

#[test]
fn envelope_is_unwrapped_once() {
    let inner = json!([{"name": "Lot", "lat": "25", "lon": "121", "remark": "目前空格"}]);
    let body = json!({"contents": inner.to_string(), "status": {"http_code": 200}});
    let records = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].occupancy, Occupancy::Free);
}

#[test]
fn nested_envelope_is_not_unwrapped_twice() {
    let inner = json!({"contents": "[]"});
    let body = json!({"contents": inner.to_string()});
    let err = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap_err();
    assert!(matches!(err, FormatError::NotAList { found: "an object" }));
}

#[test]
fn envelope_with_invalid_json_is_a_format_error() {
    let body = json!({"contents": "<html>rate limited</html>"});
    let err = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap_err();
    assert!(matches!(err, FormatError::EnvelopeDecode(_)));

    let body = json!({"contents": 42});
    let err = try_normalize(&body, PayloadFormat::LegacyPoi).unwrap_err();
    assert!(matches!(err, FormatError::EnvelopeNotString));
}

#[test]
fn empty_envelope_is_an_empty_list() {
    let body = json!({"contents": ""});
    assert!(try_normalize(&body, PayloadFormat::LegacyPoi).unwrap().is_empty());
}

#[test]
fn non_list_payload_normalizes_to_empty() {
    for body in [json!({"error": "busy"}), json!("text"), json!(7)] {
        assert!(normalize(&raw(body, PayloadFormat::LegacyPoi)).is_empty());
    }
}

#[test]
fn duplicate_spaces_aggregate_into_one_facility() {
    let body = json!([
        {"name": "City Lot 1", "lat": "25.03", "lon": "121.5", "remark": "目前空格", "dataType": 1},
        {"name": "City Lot 1", "lat": "25.03", "lon": "121.5", "remark": "目前有車停放", "dataType": 1}
    ]);
    let records = normalize(&raw(body, PayloadFormat::LegacyPoi));
    let summaries = parkwatch_core::aggregate(&records);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "City Lot 1");
    assert_eq!(summaries[0].regular_total, 2);
    assert_eq!(summaries[0].regular_available, 1);
    assert_eq!(summaries[0].accessible_total, 0);
}
