use crate::models::InventoryCity;
use crate::search::traits::InventoryProvider;

/// In-memory inventory snapshot. The production application feeds the
/// interpreter from its listings database; this covers the demo binary,
/// tests, and any embedding that already holds the city counts.
pub struct StaticInventory {
    cities: Vec<InventoryCity>,
}

impl StaticInventory {
    pub fn new(cities: Vec<InventoryCity>) -> Self {
        Self { cities }
    }

    /// Representative Azuay-market snapshot for the demo binary
    pub fn sample() -> Self {
        Self::new(vec![
            InventoryCity::new("Cuenca", 42),
            InventoryCity::new("Gualaceo", 8),
            InventoryCity::new("Paute", 5),
            InventoryCity::new("Azogues", 4),
            InventoryCity::new("Sigsig", 2),
        ])
    }
}

impl InventoryProvider for StaticInventory {
    fn list_serviced_cities(&self) -> Vec<InventoryCity> {
        self.cities.clone()
    }
}
