use async_trait::async_trait;
use serde_json::{json, Value};

use super::backend::SearchBackend;
use crate::{
    content_type::ContentType,
    error::Result,
    format::sort,
    types::{SearchItem, SearchRequest, SuggestionItem, SuggestionKind, MIN_QUERY_LEN},
};

const MAX_SUGGESTIONS: usize = 8;

/// Seeded in-memory catalogue that answers like the search API.
///
/// Used by `travel dev` so the front end can be exercised without a server.
#[derive(Debug, Clone)]
pub struct DevBackend {
    destinations: Vec<SearchItem>,
    flights: Vec<SearchItem>,
    hotels: Vec<SearchItem>,
}

impl Default for DevBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DevBackend {
    pub fn new() -> Self {
        Self {
            destinations: to_items(seed_destinations()),
            flights: to_items(seed_flights()),
            hotels: to_items(seed_hotels()),
        }
    }

    fn catalogue(&self, content_type: ContentType) -> &[SearchItem] {
        match content_type {
            ContentType::Destinations => &self.destinations,
            ContentType::Flights => &self.flights,
            ContentType::Hotels => &self.hotels,
        }
    }
}

fn to_items(values: Vec<Value>) -> Vec<SearchItem> {
    values.into_iter().filter_map(SearchItem::from_value).collect()
}

fn searchable_text(item: &SearchItem) -> String {
    item.as_map()
        .values()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn matches_filter(item: &SearchItem, key: &str, value: &str) -> bool {
    match item.get(key) {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(value),
        Some(other) => other.to_string() == value,
        None => false,
    }
}

#[async_trait]
impl SearchBackend for DevBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let needle = request.query.trim().to_lowercase();

        let mut matched: Vec<SearchItem> = self
            .catalogue(request.content_type)
            .iter()
            .filter(|item| searchable_text(item).contains(&needle))
            .filter(|item| {
                request
                    .filters
                    .iter()
                    .all(|(key, value)| matches_filter(item, key, value))
            })
            .cloned()
            .collect();

        if let Some(key) = request.sort_key.as_deref() {
            matched = sort(matched, key, request.sort_descending);
        }

        let total = matched.len();
        let page_size = request.page_size.max(1) as usize;
        let page = request.page.max(1) as usize;
        let results: Vec<SearchItem> = matched
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(json!({
            "results": results,
            "total": total,
            "page": page,
            "pageSize": page_size,
        }))
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<SuggestionItem>> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let destinations = self
            .destinations
            .iter()
            .filter_map(SearchItem::name)
            .map(|name| (name, SuggestionKind::Destination));
        let hotels = self
            .hotels
            .iter()
            .filter_map(SearchItem::name)
            .map(|name| (name, SuggestionKind::Hotel));

        Ok(destinations
            .chain(hotels)
            .filter(|(name, _)| name.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(|(name, kind)| SuggestionItem::new(name, kind))
            .collect())
    }

    async fn health(&self) -> Result<Value> {
        Ok(json!({
            "status": "Healthy",
            "backend": "dev",
            "documents": self.destinations.len() + self.flights.len() + self.hotels.len(),
        }))
    }
}

fn seed_destinations() -> Vec<Value> {
    let destination = |id: u32, name: &str, country: &str, description: &str| {
        json!({
            "id": id,
            "name": name,
            "country": country,
            "description": description,
        })
    };

    vec![
        destination(1, "Paris", "France", "Museums, cafés and the Seine"),
        destination(2, "Parma", "Italy", "Ham, cheese and a quiet old town"),
        destination(3, "Hunza Valley", "Pakistan", "Apricot orchards under Rakaposhi"),
        destination(4, "Skardu", "Pakistan", "Gateway to the Karakoram"),
        destination(5, "Istanbul", "Turkey", "Bazaars on two continents"),
        destination(6, "Dubai", "United Arab Emirates", "Desert safaris and skylines"),
        destination(7, "Lahore", "Pakistan", "Mughal forts and food streets"),
        destination(8, "Baku", "Azerbaijan", "Flame towers on the Caspian"),
        destination(9, "Kuala Lumpur", "Malaysia", "Petronas towers and street food"),
        destination(10, "Paro", "Bhutan", "Tiger's Nest monastery"),
        destination(11, "Antalya", "Turkey", "Turquoise coast beaches"),
        destination(12, "Swat", "Pakistan", "The Switzerland of the East"),
    ]
}

fn seed_flights() -> Vec<Value> {
    let flight = |id: u32, airline: &str, from: &str, to: &str, price: u32, departs: &str| {
        json!({
            "id": id,
            "name": format!("{} {} to {}", airline, from, to),
            "airline": airline,
            "departureDestination": from,
            "arrivalDestination": to,
            "price": price,
            "departureTime": departs,
        })
    };

    vec![
        flight(1, "PIA", "Karachi", "Paris", 215000, "2025-06-01T02:30:00+05:00"),
        flight(2, "Emirates", "Lahore", "Dubai", 68000, "2025-06-01T09:15:00+05:00"),
        flight(3, "Turkish Airlines", "Islamabad", "Istanbul", 142000, "2025-06-02T05:45:00+05:00"),
        flight(4, "Qatar Airways", "Karachi", "Paris", 198500, "2025-06-03T03:10:00+05:00"),
        flight(5, "AirBlue", "Islamabad", "Skardu", 32000, "2025-06-01T07:00:00+05:00"),
        flight(6, "Serene Air", "Lahore", "Skardu", 29500, "2025-06-04T06:30:00+05:00"),
        flight(7, "AZAL", "Lahore", "Baku", 96000, "2025-06-05T11:20:00+05:00"),
        flight(8, "Malaysia Airlines", "Karachi", "Kuala Lumpur", 121000, "2025-06-06T23:55:00+05:00"),
    ]
}

fn seed_hotels() -> Vec<Value> {
    let hotel = |id: u32, name: &str, destination: &str, rating: u32, price: u32| {
        json!({
            "id": id,
            "name": name,
            "destination": destination,
            "rating": rating,
            "pricePerNight": price,
        })
    };

    vec![
        hotel(1, "Hotel Le Marais", "Paris", 4, 48000),
        hotel(2, "Park Hyatt Paris", "Paris", 5, 210000),
        hotel(3, "Serena Hunza", "Hunza Valley", 4, 26000),
        hotel(4, "Shangrila Resort", "Skardu", 4, 31000),
        hotel(5, "Pera Palace", "Istanbul", 5, 95000),
        hotel(6, "Pearl Continental", "Lahore", 5, 42000),
        hotel(7, "Avari Lahore", "Lahore", 4, 36000),
        hotel(8, "Parkside Inn", "Parma", 3, 17000),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format;

    #[tokio::test]
    async fn search_pages_matches() {
        let backend = DevBackend::new();
        let request = SearchRequest::new("pakistan", ContentType::Destinations).with_page(1);
        let body = backend.search(&request).await.unwrap();
        let response = format(&body, ContentType::Destinations);

        assert_eq!(response.total, 4);
        assert_eq!(response.total_pages, 1);
        assert_eq!(response.results.len(), 4);
    }

    #[tokio::test]
    async fn search_applies_filters_and_sort() {
        let backend = DevBackend::new();
        let request = SearchRequest::new("paris", ContentType::Hotels)
            .with_sort(Some("pricePerNight".to_string()), true)
            .with_filters(vec![("destination".to_string(), "paris".to_string())]);
        let response = format(
            &backend.search(&request).await.unwrap(),
            ContentType::Hotels,
        );

        let names: Vec<_> = response.results.iter().filter_map(SearchItem::name).collect();
        assert_eq!(names, vec!["Park Hyatt Paris", "Hotel Le Marais"]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let backend = DevBackend::new();
        let request = SearchRequest::new("karachi", ContentType::Flights).with_page(5);
        let response = format(
            &backend.search(&request).await.unwrap(),
            ContentType::Flights,
        );
        assert_eq!(response.total, 3);
        assert!(response.results.is_empty());
        assert!(!response.is_displayable());
    }

    #[tokio::test]
    async fn autocomplete_mixes_destinations_and_hotels() {
        let backend = DevBackend::new();
        let items = backend.autocomplete("par").await.unwrap();

        assert!(items.contains(&SuggestionItem::new("Paris", SuggestionKind::Destination)));
        assert!(items.contains(&SuggestionItem::new("Parkside Inn", SuggestionKind::Hotel)));
        assert!(backend.autocomplete("p").await.unwrap().is_empty());
    }
}
