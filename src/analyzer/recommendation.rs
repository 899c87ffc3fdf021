use crate::analyzer::comparison::{Comparison, SortCriterion};
use crate::model::Offer;
use crate::utils::{format_currency, format_rating, round_cents};
use serde::Serialize;

/// Largest premium over the best offer, in reais, still considered worth paying.
pub const WORTH_IT_THRESHOLD: f64 = 2.0;

pub const REASON_SEPARATOR: &str = " • ";
pub const FALLBACK_REASON: &str = "Best overall balance of price, delivery and rating";

/// Why the recommended offer was picked, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    BestPrice,
    FreeDelivery,
    HighRating,
    Nearby,
    Savings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub offer: Offer,
    pub reasons: Vec<ReasonCode>,
    pub reason_text: String,
}

/// Whether an offer's premium over the best offer is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub offer_id: u64,
    pub worth_it: bool,
    pub reason_text: String,
    pub savings: f64,
    /// Negative when the flagged best offer is not the cheapest one.
    pub price_gap_to_best: f64,
}

/// Compares one offer against the comparison's best offer.
pub fn analyze_offer(comparison: &Comparison, offer_id: u64) -> Option<Analysis> {
    let offer = comparison.offer_by_id(offer_id)?;
    let best = comparison.best_offer()?;
    Some(analyze_against(offer, best))
}

/// One analysis per offer, in comparison order.
pub fn analyze_all(comparison: &Comparison) -> Vec<Analysis> {
    match comparison.best_offer() {
        Some(best) => comparison
            .offers()
            .iter()
            .map(|offer| analyze_against(offer, best))
            .collect(),
        None => Vec::new(),
    }
}

fn analyze_against(offer: &Offer, best: &Offer) -> Analysis {
    let gap = round_cents(offer.price() - best.price());
    let worth_it = gap <= WORTH_IT_THRESHOLD;
    let gap_text = format_currency(gap);

    let reason_text = if offer.id() == best.id() {
        "This is the best offer available".to_string()
    } else if worth_it && offer.has_free_delivery() && !best.has_free_delivery() {
        format!("Worth it: free delivery makes up for the {} difference", gap_text)
    } else if worth_it && offer.is_nearby() && !best.is_nearby() {
        format!(
            "Worth it: the seller is nearby ({}), which makes up for the {} difference",
            offer.distance_descriptor(),
            gap_text
        )
    } else if worth_it && offer.rating() > best.rating() {
        format!(
            "Worth it: better rated seller ({} vs {}) for {} more",
            format_rating(offer.rating()),
            format_rating(best.rating()),
            gap_text
        )
    } else if worth_it {
        format!("Acceptable price difference of {} compared to the best offer", gap_text)
    } else {
        format!("You pay {} more than the best offer", gap_text)
    };

    Analysis {
        offer_id: offer.id(),
        worth_it,
        reason_text,
        savings: offer.savings_amount(),
        price_gap_to_best: gap,
    }
}

/// Picks the highest scored offer (earliest on ties) and explains why.
pub fn recommend(comparison: &Comparison) -> Option<Recommendation> {
    let offer = comparison
        .sort(SortCriterion::Score)
        .into_iter()
        .next()?;

    let mut reasons = Vec::new();
    let mut parts = Vec::new();

    if offer.is_best_price() {
        reasons.push(ReasonCode::BestPrice);
        parts.push("Best price".to_string());
    }
    if offer.has_free_delivery() {
        reasons.push(ReasonCode::FreeDelivery);
        parts.push("Free delivery".to_string());
    }
    if offer.has_high_rating() {
        reasons.push(ReasonCode::HighRating);
        parts.push(format!("Well rated: {}", offer.formatted_rating()));
    }
    if offer.is_nearby() {
        reasons.push(ReasonCode::Nearby);
        parts.push(format!("Nearby: {}", offer.distance_descriptor()));
    }
    if offer.has_savings() {
        reasons.push(ReasonCode::Savings);
        parts.push(format!("Save {}", offer.formatted_savings()));
    }

    let reason_text = if parts.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        parts.join(REASON_SEPARATOR)
    };

    Some(Recommendation {
        offer,
        reasons,
        reason_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductInfo, RawOffer};
    use crate::normalizer::normalize_offer;

    fn raw(id: u64, price: f64) -> RawOffer {
        RawOffer {
            id,
            seller_id: id,
            seller_name: format!("Loja {}", id),
            price: Some(price),
            distance_descriptor: Some("5 km".into()),
            delivery_fee_descriptor: Some("R$ 5,00".into()),
            rating: Some(4.0),
            ..RawOffer::default()
        }
    }

    fn comparison(raws: Vec<RawOffer>) -> Comparison {
        let offers = raws
            .into_iter()
            .map(|r| normalize_offer(1, r).expect("valid offer"))
            .collect();
        Comparison::new(ProductInfo { id: 1, ..ProductInfo::default() }, offers)
    }

    fn best_and(other: RawOffer) -> Comparison {
        comparison(vec![RawOffer { explicit_best_price: Some(true), ..raw(1, 12.9) }, other])
    }

    #[test]
    fn missing_offer_or_best_yields_none() {
        assert!(analyze_offer(&Comparison::empty(1), 1).is_none());
        assert!(analyze_offer(&best_and(raw(2, 14.9)), 99).is_none());
        assert!(analyze_all(&Comparison::empty(1)).is_empty());
    }

    #[test]
    fn best_offer_is_reported_as_such() {
        let a = analyze_offer(&best_and(raw(2, 14.9)), 1).expect("analysis");
        assert!(a.worth_it);
        assert_eq!(a.price_gap_to_best, 0.0);
        assert_eq!(a.reason_text, "This is the best offer available");
    }

    #[test]
    fn gap_equal_to_threshold_is_worth_it() {
        let a = analyze_offer(&best_and(raw(2, 14.9)), 2).expect("analysis");
        assert_eq!(a.price_gap_to_best, 2.0);
        assert!(a.worth_it);
        assert_eq!(
            a.reason_text,
            "Acceptable price difference of R$ 2,00 compared to the best offer"
        );
    }

    #[test]
    fn gap_above_threshold_states_the_amount() {
        let a = analyze_offer(&best_and(raw(2, 15.9)), 2).expect("analysis");
        assert_eq!(a.price_gap_to_best, 3.0);
        assert!(!a.worth_it);
        assert_eq!(a.reason_text, "You pay R$ 3,00 more than the best offer");
    }

    #[test]
    fn compensations_follow_priority() {
        let delivery = best_and(RawOffer {
            delivery_fee_descriptor: Some("Grátis".into()),
            distance_descriptor: Some("1 km".into()),
            ..raw(2, 13.9)
        });
        let text = analyze_offer(&delivery, 2).expect("analysis").reason_text;
        assert!(text.starts_with("Worth it: free delivery"), "{}", text);

        let nearby = best_and(RawOffer {
            distance_descriptor: Some("1 km".into()),
            rating: Some(5.0),
            ..raw(2, 13.9)
        });
        let text = analyze_offer(&nearby, 2).expect("analysis").reason_text;
        assert!(text.starts_with("Worth it: the seller is nearby (1 km)"), "{}", text);

        let rated = best_and(RawOffer { rating: Some(4.9), ..raw(2, 13.9) });
        let text = analyze_offer(&rated, 2).expect("analysis").reason_text;
        assert_eq!(text, "Worth it: better rated seller (4,9 vs 4,0) for R$ 1,00 more");
    }

    #[test]
    fn compensations_do_not_apply_when_too_expensive() {
        let c = best_and(RawOffer {
            delivery_fee_descriptor: Some("Grátis".into()),
            ..raw(2, 20.0)
        });
        let a = analyze_offer(&c, 2).expect("analysis");
        assert!(!a.worth_it);
        assert_eq!(a.reason_text, "You pay R$ 7,10 more than the best offer");
    }

    #[test]
    fn negative_gap_is_kept() {
        let c = best_and(RawOffer { savings_amount: Some(1.0), ..raw(2, 11.9) });
        let a = analyze_offer(&c, 2).expect("analysis");
        assert_eq!(a.price_gap_to_best, -1.0);
        assert!(a.worth_it);
        assert_eq!(a.savings, 1.0);
    }

    #[test]
    fn analyze_all_follows_offer_order() {
        let c = best_and(raw(2, 15.9));
        let all = analyze_all(&c);
        assert_eq!(all.iter().map(|a| a.offer_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(all[0].worth_it && !all[1].worth_it);
    }

    #[test]
    fn recommendation_lists_reasons_in_fixed_order() {
        let c = comparison(vec![
            raw(1, 10.0),
            RawOffer {
                explicit_best_price: Some(true),
                delivery_fee_descriptor: Some("Grátis".into()),
                rating: Some(4.8),
                distance_descriptor: Some("1.2 km".into()),
                savings_amount: Some(2.0),
                ..raw(2, 12.9)
            },
        ]);
        let rec = recommend(&c).expect("recommendation");
        assert_eq!(rec.offer.id(), 2);
        assert_eq!(
            rec.reasons,
            vec![
                ReasonCode::BestPrice,
                ReasonCode::FreeDelivery,
                ReasonCode::HighRating,
                ReasonCode::Nearby,
                ReasonCode::Savings
            ]
        );
        assert_eq!(
            rec.reason_text,
            "Best price • Free delivery • Well rated: 4,8 • Nearby: 1.2 km • Save R$ 2,00"
        );
    }

    #[test]
    fn recommendation_falls_back_to_generic_reason() {
        let c = comparison(vec![raw(1, 10.0), raw(2, 9.0)]);
        let rec = recommend(&c).expect("recommendation");
        // equal scores: the earliest offer wins
        assert_eq!(rec.offer.id(), 1);
        assert!(rec.reasons.is_empty());
        assert_eq!(rec.reason_text, FALLBACK_REASON);
        assert!(recommend(&Comparison::empty(1)).is_none());
    }
}
