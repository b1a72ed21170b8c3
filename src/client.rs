use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::Display;
use std::iter;

use chrono::NaiveDateTime;
use url::Url;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{fetch_with_retry, HttpTransport, Transport};
use crate::models::{
    Direction, Pattern, Prediction, Route, ServiceBulletin, Stop, TimeResolution, Vehicle,
};
use crate::parser;
use crate::retry::RetryPolicy;

pub const API_KEY_PARAM: &str = "key";

/// Route-level vehicle timestamps come back without seconds.
const ROUTE_VEHICLE_TIME_FORMAT: &str = "%Y%m%d %H:%M";

/// Client for the BusTracker API.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of sequential or concurrent calls.
#[derive(Debug, Clone)]
pub struct BusTracker<T = HttpTransport> {
    config: ClientConfig,
    retry: RetryPolicy,
    transport: T,
}

impl BusTracker<HttpTransport> {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> BusTracker<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            retry: config.retry_policy(),
            config,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{root}/{version}/{operation}?{params}&key={api key}`, every value URL-encoded.
    pub fn build_api_url(&self, operation: &str, params: &[(&str, String)]) -> Result<Url> {
        let base = format!(
            "{}/{}/{}",
            self.config.root_url.trim_end_matches('/'),
            self.config.api_version,
            operation
        );
        let params = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .chain(iter::once((API_KEY_PARAM, self.config.api_key.as_str())));

        Ok(Url::parse_with_params(&base, params)?)
    }

    fn fetch(&self, operation: &str, params: &[(&str, String)]) -> Result<String> {
        let url = self.build_api_url(operation, params)?;
        fetch_with_retry(&self.transport, &url, &self.retry)
    }

    /// Current system time of the BusTracker service.
    pub fn get_time(&self) -> Result<NaiveDateTime> {
        let body = self.fetch("gettime", &[])?;
        parser::parse_time(&body)
    }

    /// Vehicles by id, with second-resolution timestamps.
    pub fn get_vehicles<I>(&self, vehicle_ids: I) -> Result<Vec<Vehicle>>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let resolution = TimeResolution::Seconds;
        let body = self.fetch(
            "getvehicles",
            &[
                ("tmres", resolution.param().to_string()),
                ("vid", join_ids(vehicle_ids)),
            ],
        )?;
        parser::parse_vehicles(&body, resolution.timestamp_format())
    }

    /// Vehicles currently running on any of the given routes.
    ///
    /// `tmstmp` is parsed with the format matching `resolution`:
    /// `%Y%m%d %H:%M:%S` for seconds, `%Y%m%d %H:%M` for minutes.
    pub fn get_vehicles_by_routes<I>(
        &self,
        route_ids: I,
        resolution: TimeResolution,
    ) -> Result<Vec<Vehicle>>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let body = self.fetch(
            "getvehicles",
            &[
                ("tmres", resolution.param().to_string()),
                ("rt", join_ids(route_ids)),
            ],
        )?;
        parser::parse_vehicles(&body, resolution.timestamp_format())
    }

    /// Vehicles active on one route, keyed by vehicle id.
    pub fn get_route_vehicles(&self, route_id: &str) -> Result<HashMap<String, Vehicle>> {
        let body = self.fetch("getvehicles", &[("rt", route_id.to_string())])?;
        parser::parse_vehicle_map(&body, ROUTE_VEHICLE_TIME_FORMAT)
    }

    /// All routes, keyed by route id.
    pub fn get_routes(&self) -> Result<HashMap<String, Route>> {
        let body = self.fetch("getroutes", &[])?;
        parser::parse_routes(&body)
    }

    pub fn get_route_directions(&self, route_id: &str) -> Result<Vec<Direction>> {
        let body = self.fetch("getdirections", &[("rt", route_id.to_string())])?;
        parser::parse_directions(&body)
    }

    /// Stops served by a route in one direction, keyed by stop id.
    ///
    /// Stops the API returns without coordinates are left out.
    pub fn get_route_stops(
        &self,
        route_id: &str,
        direction: &str,
    ) -> Result<HashMap<String, Stop>> {
        let body = self.fetch(
            "getstops",
            &[("rt", route_id.to_string()), ("dir", direction.to_string())],
        )?;
        parser::parse_stops(&body)
    }

    /// A single pattern; more than one pattern for the id is an error.
    pub fn get_pattern(&self, pattern_id: &str) -> Result<Pattern> {
        let body = self.fetch("getpatterns", &[("pid", pattern_id.to_string())])?;
        parser::parse_single_pattern(&body, pattern_id)
    }

    /// Active patterns of a route, keyed by pattern id.
    pub fn get_route_patterns(&self, route_id: &str) -> Result<HashMap<String, Pattern>> {
        let body = self.fetch("getpatterns", &[("rt", route_id.to_string())])?;
        parser::parse_patterns(&body)
    }

    pub fn get_vehicle_predictions<I>(&self, vehicle_ids: I) -> Result<Vec<Prediction>>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.predictions(&[("vid", join_ids(vehicle_ids))])
    }

    pub fn get_stop_predictions<I>(&self, stop_ids: I) -> Result<Vec<Prediction>>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.predictions(&[("stpid", join_ids(stop_ids))])
    }

    /// Predictions at the given stops, limited to the given routes.
    pub fn get_stop_route_predictions<S, R>(
        &self,
        stop_ids: S,
        route_ids: R,
    ) -> Result<Vec<Prediction>>
    where
        S: IntoIterator,
        S::Item: Display,
        R: IntoIterator,
        R::Item: Display,
    {
        self.predictions(&[("stpid", join_ids(stop_ids)), ("rt", join_ids(route_ids))])
    }

    fn predictions(&self, params: &[(&str, String)]) -> Result<Vec<Prediction>> {
        let body = self.fetch("getpredictions", params)?;
        parser::parse_predictions(&body)
    }

    /// Bulletins for a route, optionally narrowed to one direction.
    pub fn get_route_service_bulletins(
        &self,
        route_id: &str,
        direction: Option<&str>,
    ) -> Result<Vec<ServiceBulletin>> {
        let mut params = vec![("rt", route_id.to_string())];
        if let Some(direction) = direction {
            params.push(("rtdir", direction.to_string()));
        }
        self.service_bulletins(&params)
    }

    pub fn get_stop_service_bulletins(&self, stop_id: &str) -> Result<Vec<ServiceBulletin>> {
        self.service_bulletins(&[("stpid", stop_id.to_string())])
    }

    fn service_bulletins(&self, params: &[(&str, String)]) -> Result<Vec<ServiceBulletin>> {
        let body = self.fetch("getservicebulletins", params)?;
        parser::parse_service_bulletins(&body)
    }
}

fn join_ids<I>(ids: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    ids.into_iter().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{Affected, PredictionType};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays canned bodies (or errors) and records every requested URL.
    #[derive(Default)]
    struct CannedTransport {
        responses: RefCell<VecDeque<Result<String>>>,
        requests: RefCell<Vec<Url>>,
    }

    impl CannedTransport {
        fn replying(bodies: &[&str]) -> Self {
            let transport = Self::default();
            for body in bodies {
                transport.push(Ok(body.to_string()));
            }
            transport
        }

        fn push(&self, response: Result<String>) {
            self.responses.borrow_mut().push_back(response);
        }
    }

    impl Transport for CannedTransport {
        fn get(&self, url: &Url) -> Result<String> {
            self.requests.borrow_mut().push(url.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no canned response left")
        }
    }

    fn connection_refused() -> Error {
        Error::Transport {
            url: "http://localhost".to_string(),
            transient: true,
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }

    fn tracker(transport: CannedTransport) -> BusTracker<CannedTransport> {
        let config = ClientConfig::new("api_key")
            .with_root_url("http://localhost/bustime/api/")
            .with_initial_delay(Duration::ZERO);
        BusTracker::with_transport(config, transport)
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    const VEHICLE_1870: &str = r#"<bustime-response>
<vehicle>
<vid>1870</vid>
<tmstmp>20171112 20:07:47</tmstmp>
<lat>41.9783533387265</lat>
<lon>-87.68994619078555</lon>
<hdg>334</hdg>
<pid>1180</pid>
<rt>49</rt>
<des>Berwyn</des>
<pdist>83642</pdist>
<dly>true</dly>
<tablockid>49 -503</tablockid>
<tatripid>67</tatripid>
<zone/>
</vehicle>
</bustime-response>"#;

    #[test]
    fn test_build_api_url_encodes_params_and_appends_key() {
        let client = tracker(CannedTransport::default());

        let url = client
            .build_api_url(
                "getstops",
                &[
                    ("rt", "49".to_string()),
                    ("dir", "South Bound & Co".to_string()),
                ],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost/bustime/api/v1/getstops?rt=49&dir=South+Bound+%26+Co&key=api_key"
        );
    }

    #[test]
    fn test_get_vehicles_parses_fixture() {
        let client = tracker(CannedTransport::replying(&[VEHICLE_1870]));

        let vehicles = client.get_vehicles([1870]).unwrap();

        assert_eq!(vehicles.len(), 1);
        let vehicle = &vehicles[0];
        assert_eq!(vehicle.id, "1870");
        assert_eq!(vehicle.last_update.to_string(), "2017-11-12 20:07:47");
        assert_eq!(vehicle.latitude, "41.9783533387265");
        assert_eq!(vehicle.longitude, "-87.68994619078555");
        assert_eq!(vehicle.heading, 334);
        assert_eq!(vehicle.pattern_id, "1180");
        assert_eq!(vehicle.route_id, "49");
        assert_eq!(vehicle.destination, "Berwyn");
        assert_eq!(vehicle.distance_into_route, 83642.0);
        assert!(vehicle.delayed);

        let requests = client.transport.requests.borrow();
        assert_eq!(requests[0].path(), "/bustime/api/v1/getvehicles");
        assert_eq!(
            query(&requests[0]),
            vec![
                ("tmres".to_string(), "s".to_string()),
                ("vid".to_string(), "1870".to_string()),
                ("key".to_string(), "api_key".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_vehicles_by_routes_joins_route_ids() {
        let client = tracker(CannedTransport::replying(&["<bustime-response/>"]));

        let vehicles = client
            .get_vehicles_by_routes(["49", "X49"], TimeResolution::Minutes)
            .unwrap();

        assert!(vehicles.is_empty());
        let requests = client.transport.requests.borrow();
        assert_eq!(
            query(&requests[0])[..2],
            [
                ("tmres".to_string(), "m".to_string()),
                ("rt".to_string(), "49,X49".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_vehicles_by_routes_follows_requested_resolution() {
        let minutes = VEHICLE_1870.replace("20171112 20:07:47", "20171112 20:07");
        let client = tracker(CannedTransport::replying(&[minutes.as_str(), VEHICLE_1870]));

        let by_minute = client
            .get_vehicles_by_routes(["49"], TimeResolution::Minutes)
            .unwrap();
        let by_second = client
            .get_vehicles_by_routes(["49"], TimeResolution::Seconds)
            .unwrap();

        assert_eq!(by_minute[0].last_update.to_string(), "2017-11-12 20:07:00");
        assert_eq!(by_second[0].last_update.to_string(), "2017-11-12 20:07:47");
    }

    #[test]
    fn test_get_route_vehicles_uses_minute_timestamps() {
        let body = VEHICLE_1870.replace("20171112 20:07:47", "20171112 20:07");
        let client = tracker(CannedTransport::replying(&[body.as_str()]));

        let vehicles = client.get_route_vehicles("49").unwrap();

        assert_eq!(vehicles["1870"].last_update.to_string(), "2017-11-12 20:07:00");
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let transport = CannedTransport::default();
        transport.push(Err(connection_refused()));
        transport.push(Err(connection_refused()));
        transport.push(Ok(
            "<bustime-response><tm>20171112 20:07:47</tm></bustime-response>".to_string(),
        ));
        let client = tracker(transport);

        let time = client.get_time().unwrap();

        assert_eq!(time.to_string(), "2017-11-12 20:07:47");
        assert_eq!(client.transport.requests.borrow().len(), 3);
    }

    #[test]
    fn test_exhausted_retries_propagate_transport_error() {
        let transport = CannedTransport::default();
        for _ in 0..3 {
            transport.push(Err(connection_refused()));
        }
        let client = tracker(transport);

        let err = client.get_routes().unwrap_err();

        assert!(matches!(err, Error::Transport { transient: true, .. }));
        assert_eq!(client.transport.requests.borrow().len(), 3);
    }

    #[test]
    fn test_retry_disabled_makes_one_attempt() {
        let transport = CannedTransport::default();
        transport.push(Err(connection_refused()));
        transport.push(Ok("<bustime-response/>".to_string()));
        let config = ClientConfig::new("api_key").with_retry_enabled(false);
        let client = BusTracker::with_transport(config, transport);

        assert!(client.get_routes().is_err());
        assert_eq!(client.transport.requests.borrow().len(), 1);
    }

    #[test]
    fn test_get_route_stops_excludes_stops_without_coordinates() {
        let body = r#"<bustime-response>
<stop><stpid>1</stpid><stpnm>A</stpnm><lat>41.9</lat><lon>-87.6</lon></stop>
<stop><stpid>2</stpid><stpnm>B</stpnm></stop>
<stop><stpid>3</stpid><stpnm>C</stpnm><lat>41.8</lat><lon>-87.7</lon></stop>
</bustime-response>"#;
        let client = tracker(CannedTransport::replying(&[body]));

        let stops = client.get_route_stops("49", "Southbound").unwrap();

        assert_eq!(stops.len(), 2);
        assert!(!stops.contains_key("2"));
    }

    #[test]
    fn test_get_pattern_rejects_ambiguous_id() {
        let body = r#"<bustime-response>
<ptr><pid>1180</pid><ln>1.0</ln><rtdir>Southbound</rtdir></ptr>
<ptr><pid>1180</pid><ln>1.0</ln><rtdir>Southbound</rtdir></ptr>
</bustime-response>"#;
        let client = tracker(CannedTransport::replying(&[body]));

        let err = client.get_pattern("1180").unwrap_err();

        assert!(matches!(err, Error::AmbiguousPattern { count: 2, .. }));
    }

    #[test]
    fn test_vehicle_and_stop_predictions_share_parsing() {
        let body = r#"<bustime-response><prd>
<tmstmp>20171112 20:07</tmstmp><typ>A</typ><stpid>8230</stpid><stpnm>Western &amp; Devon</stpnm>
<vid>1870</vid><dstp>1428</dstp><rt>49</rt><rtdir>Southbound</rtdir><des>Berwyn</des>
<prdtm>20171112 20:12</prdtm>
</prd></bustime-response>"#;
        let client = tracker(CannedTransport::replying(&[body, body, body]));

        let by_vehicle = client.get_vehicle_predictions(["1870"]).unwrap();
        let by_stop = client.get_stop_predictions([8230, 8231]).unwrap();
        let by_stop_and_route = client.get_stop_route_predictions([8230], ["49"]).unwrap();

        assert_eq!(by_vehicle, by_stop);
        assert_eq!(by_stop, by_stop_and_route);
        assert_eq!(by_vehicle[0].prediction_type, PredictionType::Arrival);

        let requests = client.transport.requests.borrow();
        assert_eq!(query(&requests[0])[0], ("vid".to_string(), "1870".to_string()));
        assert_eq!(query(&requests[1])[0], ("stpid".to_string(), "8230,8231".to_string()));
        assert_eq!(query(&requests[2])[1], ("rt".to_string(), "49".to_string()));
    }

    #[test]
    fn test_route_bulletins_pass_optional_direction() {
        let body = r#"<bustime-response><sb>
<sbj>Reroute</sbj><dtl>Full</dtl><brf>Short</brf><prty>High</prty>
<srvc><stpid>8230</stpid></srvc><srvc><rt>49</rt></srvc>
</sb></bustime-response>"#;
        let client = tracker(CannedTransport::replying(&[body, body, body]));

        let bulletins = client.get_route_service_bulletins("49", None).unwrap();
        client
            .get_route_service_bulletins("49", Some("Southbound"))
            .unwrap();
        client.get_stop_service_bulletins("8230").unwrap();

        assert_eq!(
            bulletins[0].affects,
            vec![Affected::Stop("8230".to_string()), Affected::Route("49".to_string())]
        );

        let requests = client.transport.requests.borrow();
        assert_eq!(query(&requests[0]).len(), 2);
        assert_eq!(query(&requests[1])[1], ("rtdir".to_string(), "Southbound".to_string()));
        assert_eq!(query(&requests[2])[0], ("stpid".to_string(), "8230".to_string()));
    }

    #[test]
    fn test_api_error_payload_is_not_parsed_as_records() {
        let body = r#"<bustime-response><error><msg>Invalid API access key supplied</msg></error></bustime-response>"#;
        let client = tracker(CannedTransport::replying(&[body]));

        match client.get_route_directions("49") {
            Err(Error::Api(errors)) => {
                assert_eq!(errors[0].message, "Invalid API access key supplied")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
