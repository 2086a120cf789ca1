//! Closed enumeration of shippable countries with their states and cities,
//! backing the cascading country/state/city selectors at checkout.

/// `(country, [(state, [city, ...]), ...])`
type CountryEntry = (&'static str, &'static [StateEntry]);
type StateEntry = (&'static str, &'static [&'static str]);

const REGIONS: &[CountryEntry] = &[
    (
        "India",
        &[
            ("Maharashtra", &["Mumbai", "Pune", "Nagpur"]),
            ("Karnataka", &["Bengaluru", "Mysuru", "Mangaluru"]),
            ("Tamil Nadu", &["Chennai", "Coimbatore", "Madurai"]),
            ("Delhi", &["New Delhi"]),
            ("Gujarat", &["Ahmedabad", "Surat", "Vadodara"]),
        ],
    ),
    (
        "United States",
        &[
            ("California", &["Los Angeles", "San Francisco", "San Diego"]),
            ("New York", &["New York City", "Buffalo", "Albany"]),
            ("Texas", &["Houston", "Austin", "Dallas"]),
        ],
    ),
    (
        "United Kingdom",
        &[
            ("England", &["London", "Manchester", "Birmingham"]),
            ("Scotland", &["Edinburgh", "Glasgow"]),
        ],
    ),
];

/// All shippable countries.
pub fn countries() -> Vec<&'static str> {
    REGIONS.iter().map(|(country, _)| *country).collect()
}

pub fn is_known_country(country: &str) -> bool {
    REGIONS.iter().any(|(c, _)| *c == country)
}

/// States for a country; empty when the country is unknown.
pub fn states(country: &str) -> Vec<&'static str> {
    REGIONS
        .iter()
        .find(|(c, _)| *c == country)
        .map(|(_, states)| states.iter().map(|(s, _)| *s).collect())
        .unwrap_or_default()
}

/// Cities for a state within a country; empty when either is unknown.
pub fn cities(country: &str, state: &str) -> Vec<&'static str> {
    REGIONS
        .iter()
        .find(|(c, _)| *c == country)
        .and_then(|(_, states)| states.iter().find(|(s, _)| *s == state))
        .map(|(_, cities)| cities.to_vec())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_country_is_listed() {
        assert!(is_known_country("India"));
    }

    #[test]
    fn test_states_scoped_to_country() {
        assert!(states("India").contains(&"Maharashtra"));
        assert!(!states("United States").contains(&"Maharashtra"));
        assert!(states("Atlantis").is_empty());
    }

    #[test]
    fn test_cities_scoped_to_state() {
        assert!(cities("India", "Maharashtra").contains(&"Mumbai"));
        assert!(cities("India", "Karnataka").contains(&"Bengaluru"));
        assert!(cities("United States", "Maharashtra").is_empty());
    }
}
