use roxmltree::Node;

use super::fields::{Fields, FieldTable, Presence};
use super::response::parse_records;
use crate::error::Result;
use crate::models::{Prediction, PredictionType};

pub const PREDICTION_TIME_FORMAT: &str = "%Y%m%d %H:%M";

const PREDICTION_FIELDS: FieldTable = &[
    ("tmstmp", Presence::Required),
    ("typ", Presence::Required),
    ("stpid", Presence::Required),
    ("stpnm", Presence::Required),
    ("dstp", Presence::Required),
    ("vid", Presence::Required),
    ("rt", Presence::Required),
    ("rtdir", Presence::Required),
    ("des", Presence::Required),
    ("prdtm", Presence::Required),
    ("dly", Presence::Optional),
];

fn parse_prediction(node: Node<'_, '_>) -> Result<Option<Prediction>> {
    let Some(fields) = Fields::extract(node, "prd", PREDICTION_FIELDS)? else {
        return Ok(None);
    };

    let code = fields.required("typ")?;
    let prediction_type = PredictionType::from_code(code)
        .ok_or_else(|| fields.invalid("typ", code, "expected A or D"))?;

    Ok(Some(Prediction {
        last_update: fields.timestamp("tmstmp", PREDICTION_TIME_FORMAT)?,
        prediction_type,
        stop_id: fields.text("stpid")?,
        stop_name: fields.text("stpnm")?,
        distance_to_destination: fields.parse("dstp")?,
        vehicle_id: fields.text("vid")?,
        route_id: fields.text("rt")?,
        direction: fields.text("rtdir")?,
        destination: fields.text("des")?,
        predicted_time: fields.timestamp("prdtm", PREDICTION_TIME_FORMAT)?,
        delayed: fields.flag("dly"),
    }))
}

/// `getpredictions`, whichever way the request was filtered.
pub fn parse_predictions(body: &str) -> Result<Vec<Prediction>> {
    parse_records(body, "prd", parse_prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;

    const PREDICTIONS: &str = r#"<?xml version="1.0"?>
<bustime-response>
<prd>
<tmstmp>20171112 20:07</tmstmp>
<typ>A</typ>
<stpid>8230</stpid>
<stpnm>Western &amp; Devon</stpnm>
<vid>1870</vid>
<dstp>1428</dstp>
<rt>49</rt>
<rtdir>Southbound</rtdir>
<des>Berwyn</des>
<prdtm>20171112 20:12</prdtm>
</prd>
<prd>
<tmstmp>20171112 20:07</tmstmp>
<typ>D</typ>
<stpid>8230</stpid>
<stpnm>Western &amp; Devon</stpnm>
<vid>1871</vid>
<dstp>0</dstp>
<rt>49</rt>
<rtdir>Northbound</rtdir>
<des>Howard</des>
<prdtm>20171112 20:20</prdtm>
<dly>true</dly>
</prd>
</bustime-response>"#;

    #[test]
    fn test_parse_predictions_in_document_order() {
        let predictions = parse_predictions(PREDICTIONS).unwrap();

        assert_eq!(predictions.len(), 2);

        let arrival = &predictions[0];
        assert_eq!(arrival.prediction_type, PredictionType::Arrival);
        assert_eq!(arrival.stop_name, "Western & Devon");
        assert_eq!(arrival.distance_to_destination, 1428);
        assert_eq!(arrival.vehicle_id, "1870");
        assert_eq!(arrival.direction, "Southbound");
        assert_eq!(
            arrival.predicted_time,
            NaiveDate::from_ymd_opt(2017, 11, 12)
                .unwrap()
                .and_hms_opt(20, 12, 0)
                .unwrap()
        );
        assert!(!arrival.delayed);

        let departure = &predictions[1];
        assert_eq!(departure.prediction_type, PredictionType::Departure);
        assert!(departure.delayed);
    }

    #[test]
    fn test_prediction_timestamps_have_minute_resolution() {
        let body = PREDICTIONS.replacen("<prdtm>20171112 20:12</prdtm>", "<prdtm>20171112 20:12:30</prdtm>", 1);
        assert!(matches!(
            parse_predictions(&body),
            Err(Error::InvalidField { field: "prdtm", .. })
        ));
    }

    #[test]
    fn test_unknown_prediction_type_is_invalid() {
        let body = PREDICTIONS.replacen("<typ>A</typ>", "<typ>Q</typ>", 1);
        assert!(matches!(
            parse_predictions(&body),
            Err(Error::InvalidField { field: "typ", .. })
        ));
    }
}
