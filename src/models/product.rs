use super::NOT_AVAILABLE;
use serde::{Deserialize, Serialize};

/// Column titles of the data sheet, in write order.
pub const OUTPUT_HEADER: [&str; 18] = [
    "Name",
    "Tag",
    "Image URL",
    "Origin",
    "Length",
    "Diameter",
    "No of Buds",
    "Weight",
    "Certificate",
    "Farm",
    "Color",
    "First Price",
    "Packing Value",
    "Available Quantity",
    "Product URL",
    "Second Price",
    "Third Price",
    "Time",
];

/// Every field a product card can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Tag,
    ImageUrl,
    Origin,
    Length,
    Diameter,
    BudCount,
    Weight,
    Certificate,
    Farm,
    Color,
    StemPrice,
    StemQuantity,
    FirstQuantityLabel,
    AvailableQuantity,
    ProductUrl,
    SecondPrice,
    SecondQuantity,
    ThirdPrice,
    ThirdQuantity,
}

/// One price/quantity option offered on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTier {
    pub price: String,
    pub quantity: String,
}

/// One scraped listing. Fields stay in serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub tag: String,
    pub image_url: String,
    pub origin: String,
    pub length: String,
    pub diameter: String,
    pub bud_count: String,
    pub weight: String,
    pub certificate: String,
    pub farm: String,
    pub color: String,
    pub stem_price: String,
    pub stem_quantity: String,
    pub first_quantity_label: String,
    pub available_quantity: String,
    pub product_url: String,
    pub second_price: String,
    pub second_quantity: String,
    pub third_price: String,
    pub third_quantity: String,
    pub capture_timestamp: String,
}

impl Default for ProductRecord {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            name: na(),
            tag: na(),
            image_url: na(),
            origin: na(),
            length: na(),
            diameter: na(),
            bud_count: na(),
            weight: na(),
            certificate: na(),
            farm: na(),
            color: na(),
            stem_price: na(),
            stem_quantity: na(),
            first_quantity_label: na(),
            available_quantity: na(),
            product_url: na(),
            second_price: na(),
            second_quantity: na(),
            third_price: na(),
            third_quantity: na(),
            capture_timestamp: na(),
        }
    }
}

impl ProductRecord {
    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Tag => &mut self.tag,
            Field::ImageUrl => &mut self.image_url,
            Field::Origin => &mut self.origin,
            Field::Length => &mut self.length,
            Field::Diameter => &mut self.diameter,
            Field::BudCount => &mut self.bud_count,
            Field::Weight => &mut self.weight,
            Field::Certificate => &mut self.certificate,
            Field::Farm => &mut self.farm,
            Field::Color => &mut self.color,
            Field::StemPrice => &mut self.stem_price,
            Field::StemQuantity => &mut self.stem_quantity,
            Field::FirstQuantityLabel => &mut self.first_quantity_label,
            Field::AvailableQuantity => &mut self.available_quantity,
            Field::ProductUrl => &mut self.product_url,
            Field::SecondPrice => &mut self.second_price,
            Field::SecondQuantity => &mut self.second_quantity,
            Field::ThirdPrice => &mut self.third_price,
            Field::ThirdQuantity => &mut self.third_quantity,
        }
    }

    /// Project the record onto the data sheet columns.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.tag.clone(),
            self.image_url.clone(),
            self.origin.clone(),
            self.length.clone(),
            self.diameter.clone(),
            self.bud_count.clone(),
            self.weight.clone(),
            self.certificate.clone(),
            self.farm.clone(),
            self.color.clone(),
            self.stem_price.clone(),
            self.first_quantity_label.clone(),
            self.available_quantity.clone(),
            self.product_url.clone(),
            self.second_price.clone(),
            self.third_price.clone(),
            self.capture_timestamp.clone(),
        ]
    }
}
