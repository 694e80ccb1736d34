//! Static reference data for the Australian domestic market: airports,
//! carriers and great-circle route distances.

use serde::Serialize;

/// Airports served by the generator and route listings, in display order.
pub const AIRPORTS: [(&str, &str); 10] = [
    ("SYD", "Sydney"),
    ("MEL", "Melbourne"),
    ("BNE", "Brisbane"),
    ("PER", "Perth"),
    ("ADL", "Adelaide"),
    ("CBR", "Canberra"),
    ("DRW", "Darwin"),
    ("HBA", "Hobart"),
    ("CNS", "Cairns"),
    ("TSV", "Townsville"),
];

/// Distance used when a route is not in [`ROUTE_DISTANCES_KM`].
pub const DEFAULT_ROUTE_DISTANCE_KM: u32 = 1000;

/// Undirected route distances. Lookups accept either direction.
const ROUTE_DISTANCES_KM: [(&str, &str, u32); 12] = [
    ("SYD", "MEL", 713),
    ("SYD", "BNE", 732),
    ("SYD", "PER", 3291),
    ("SYD", "ADL", 1165),
    ("SYD", "CBR", 244),
    ("MEL", "BNE", 1370),
    ("MEL", "PER", 2708),
    ("MEL", "ADL", 640),
    ("BNE", "PER", 3605),
    ("BNE", "ADL", 1600),
    ("PER", "ADL", 2125),
    ("MEL", "HBA", 600),
];

/// Aircraft types assigned to synthesized flights.
pub const AIRCRAFT_TYPES: [&str; 4] = ["Boeing 737", "Airbus A320", "Boeing 787", "Airbus A330"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AirportInfo {
    pub code: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteInfo {
    pub origin: String,
    pub destination: String,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u32>,
}

pub fn airport_name(code: &str) -> Option<&'static str> {
    AIRPORTS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Airport lookup. Unknown codes are still described, with name "Unknown".
pub fn airport_info(code: &str) -> AirportInfo {
    let code = code.to_ascii_uppercase();
    AirportInfo {
        name: airport_name(&code).unwrap_or("Unknown").to_string(),
        code,
        country: "Australia".to_string(),
    }
}

pub fn route_distance_km(origin: &str, destination: &str) -> Option<u32> {
    ROUTE_DISTANCES_KM
        .iter()
        .find(|(a, b, _)| {
            (a.eq_ignore_ascii_case(origin) && b.eq_ignore_ascii_case(destination))
                || (b.eq_ignore_ascii_case(origin) && a.eq_ignore_ascii_case(destination))
        })
        .map(|(_, _, km)| *km)
}

/// Every unordered pair of known airports, each listed once.
pub fn available_routes() -> Vec<RouteInfo> {
    let mut routes = Vec::new();
    for (i, (origin, _)) in AIRPORTS.iter().enumerate() {
        for (destination, _) in &AIRPORTS[i + 1..] {
            routes.push(RouteInfo {
                origin: origin.to_string(),
                destination: destination.to_string(),
                route: format!("{}-{}", origin, destination),
                distance_km: route_distance_km(origin, destination),
            });
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(route_distance_km("SYD", "MEL"), Some(713));
        assert_eq!(route_distance_km("MEL", "SYD"), Some(713));
        assert_eq!(route_distance_km("mel", "syd"), Some(713));
        assert_eq!(route_distance_km("DRW", "TSV"), None);
    }

    #[test]
    fn routes_cover_every_pair_once() {
        let routes = available_routes();
        assert_eq!(routes.len(), 45);
        assert_eq!(routes[0].route, "SYD-MEL");
        assert_eq!(routes[0].distance_km, Some(713));
    }

    #[test]
    fn unknown_airport_is_described() {
        let info = airport_info("xyz");
        assert_eq!(info.code, "XYZ");
        assert_eq!(info.name, "Unknown");
        assert_eq!(airport_info("per").name, "Perth");
    }
}
