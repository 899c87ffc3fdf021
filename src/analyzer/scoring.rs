use crate::model::{Badge, Offer};
use crate::utils::{
    distance_or_sentinel, format_currency, format_percent, format_rating, is_free_delivery,
};

pub const HIGH_RATING: f64 = 4.5;
pub const NEARBY_KM: f64 = 3.0;
pub const VERY_NEAR_KM: f64 = 2.0;
pub const LOW_STOCK_LIMIT: u32 = 10;

const BEST_PRICE_BONUS: f64 = 100.0;
const FREE_DELIVERY_BONUS: f64 = 50.0;
const HIGH_RATING_BONUS: f64 = 30.0;
const VERY_NEAR_BONUS: f64 = 20.0;
const NEARBY_BONUS: f64 = 10.0;
const SAVINGS_BONUS_CAP: f64 = 30.0;

/// Derived predicates, ranking score and display helpers.
impl Offer {
    /// Data-source hint; never recomputed from the price.
    pub fn is_best_price(&self) -> bool {
        self.explicit_best_price
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn has_savings(&self) -> bool {
        self.savings_amount > 0.0
    }

    pub fn has_free_delivery(&self) -> bool {
        is_free_delivery(&self.delivery_fee_descriptor)
    }

    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity > 0 && self.stock_quantity < LOW_STOCK_LIMIT
    }

    pub fn has_high_rating(&self) -> bool {
        self.rating >= HIGH_RATING
    }

    /// Parsed distance, or 999 when the descriptor holds no number.
    pub fn distance_km(&self) -> f64 {
        distance_or_sentinel(&self.distance_descriptor)
    }

    pub fn is_nearby(&self) -> bool {
        self.distance_km() < NEARBY_KM
    }

    pub fn discount_percent(&self) -> f64 {
        match self.previous_price {
            Some(prev) if prev > 0.0 => self.savings_amount / prev * 100.0,
            _ => 0.0,
        }
    }

    /// Additive ranking score. Each bonus is independent so the total can be
    /// explained term by term.
    pub fn score(&self) -> f64 {
        let mut score = 0.0;

        if self.is_best_price() {
            score += BEST_PRICE_BONUS;
        }
        if self.has_free_delivery() {
            score += FREE_DELIVERY_BONUS;
        }
        if self.has_high_rating() {
            score += HIGH_RATING_BONUS;
        }

        let distance = self.distance_km();
        if distance < VERY_NEAR_KM {
            score += VERY_NEAR_BONUS;
        } else if distance < NEARBY_KM {
            score += NEARBY_BONUS;
        }

        if self.has_savings() {
            score += (self.savings_amount * 2.0).min(SAVINGS_BONUS_CAP);
        }

        score
    }

    /// Strict priority: best price, then free delivery, then high rating.
    pub fn badge(&self) -> Option<Badge> {
        if self.is_best_price() {
            Some(Badge::BestPrice)
        } else if self.has_free_delivery() {
            Some(Badge::FreeDelivery)
        } else if self.has_high_rating() {
            Some(Badge::HighRating)
        } else {
            None
        }
    }

    pub fn formatted_price(&self) -> String {
        format_currency(self.price)
    }

    pub fn formatted_previous_price(&self) -> Option<String> {
        self.previous_price.map(format_currency)
    }

    pub fn formatted_savings(&self) -> String {
        format_currency(self.savings_amount)
    }

    pub fn formatted_discount(&self) -> String {
        format_percent(self.discount_percent())
    }

    pub fn formatted_rating(&self) -> String {
        format_rating(self.rating)
    }
}
