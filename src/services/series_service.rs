use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::debug;

use crate::models::{Coin, GeneratedSeries, LabelFormat, OhlcCandle, RangeCatalog, TimeRange, MIN_PRICE};
use crate::utils::errors::ChartError;
use crate::utils::rng::{fraction, seed_from_id, Lcg, RANGE_SEED_OFFSET};

pub const PERCENTAGE_DIVISOR: f64 = 100.0;

/// Length of an all-time series
pub const ALL_TIME_POINTS: usize = 60;
/// Index pinned to the all-time high (two thirds through the series)
pub const ALL_TIME_PEAK: usize = 40;
/// Multiplicative noise amplitude applied around the all-time curve (±4%)
pub const ALL_TIME_NOISE: f64 = 0.04;
/// Candle volatility for all-time series
pub const ALL_TIME_VOLATILITY: f64 = 0.035;

/// Reject NaN, infinities and anything below [`MIN_PRICE`] at the generator boundary
fn ensure_price(field: &'static str, value: f64) -> Result<f64, ChartError> {
    if value.is_finite() && value >= MIN_PRICE {
        Ok(value)
    } else {
        Err(ChartError::InvalidPrice { field, value })
    }
}

/// Generate a reproducible close/label/candle series for one coin and range
///
/// The walk starts at the price back-solved from `change_24h`, drifts by an even share of
/// that change per step plus seeded noise, and its last close is pinned to `price`.
/// Identical arguments (including `now`) always yield identical output.
pub fn generate_range_series(
    ranges: &RangeCatalog,
    coin_id: &str,
    price: f64,
    change_24h: f64,
    range: TimeRange,
    now: DateTime<Utc>,
) -> Result<GeneratedSeries, ChartError> {
    let price = ensure_price("price", price)?;
    if !change_24h.is_finite() {
        return Err(ChartError::InvalidPrice { field: "24h change", value: change_24h });
    }

    let (ordinal, config) = ranges.get(range)?;
    let points = config.points;
    let volatility = config.volatility;
    let seed = seed_from_id(coin_id, ordinal as u32 * RANGE_SEED_OFFSET);
    debug!("Generating {} series for {} (seed {}, {} points)", range, coin_id, seed, points);

    let mut rng = Lcg::new(seed);
    let trend_step = change_24h / PERCENTAGE_DIVISOR / points as f64;

    // Close prices
    let mut values = Vec::with_capacity(points);
    let mut current = (price * (1.0 - change_24h / PERCENTAGE_DIVISOR)).max(MIN_PRICE);
    for _ in 0..points {
        let noise = (fraction(&mut rng) - 0.5) * volatility;
        current = (current * (1.0 + trend_step + noise)).max(MIN_PRICE);
        values.push(current);
    }
    if let Some(last) = values.last_mut() {
        *last = price;
    }

    let labels = generate_labels(points, config.duration_ms, config.label_format, now)?;
    let ohlc = derive_ohlc(&mut rng, &values, volatility, trend_step);

    Ok(GeneratedSeries { values, labels, ohlc })
}

/// Generate a 60-point lifetime series through the all-time low, high and current price
///
/// Index 0 is pinned to `all_time_low`, index 40 to `all_time_high` and the last index to
/// `price`. The path eases in quadratically up to the peak and declines along a smoothstep
/// curve afterwards. `price` outside `[all_time_low, all_time_high]` is accepted and just
/// produces an odd-looking path.
pub fn generate_all_time_series(
    ranges: &RangeCatalog,
    coin_id: &str,
    price: f64,
    all_time_high: f64,
    all_time_low: f64,
    now: DateTime<Utc>,
) -> Result<GeneratedSeries, ChartError> {
    let price = ensure_price("price", price)?;
    let ath = ensure_price("all-time high", all_time_high)?;
    let atl = ensure_price("all-time low", all_time_low)?;
    if atl > ath {
        return Err(ChartError::InvertedBounds { high: ath, low: atl });
    }

    let (longest_ordinal, _, longest) = ranges.longest();
    let ordinal = ranges
        .get(TimeRange::All)
        .map(|(ordinal, _)| ordinal)
        .unwrap_or(longest_ordinal);
    let seed = seed_from_id(coin_id, ordinal as u32 * RANGE_SEED_OFFSET);
    debug!("Generating all-time series for {} (seed {}, ATH {}, ATL {})", coin_id, seed, ath, atl);

    let mut rng = Lcg::new(seed);
    let values = all_time_path(&mut rng, price, ath, atl);
    let labels = generate_labels(ALL_TIME_POINTS, longest.duration_ms, longest.label_format, now)?;
    let ohlc = derive_ohlc(&mut rng, &values, ALL_TIME_VOLATILITY, 0.0);

    Ok(GeneratedSeries { values, labels, ohlc })
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn all_time_path<R: RngCore + ?Sized>(rng: &mut R, price: f64, ath: f64, atl: f64) -> Vec<f64> {
    let last = ALL_TIME_POINTS - 1;
    let mut values = Vec::with_capacity(ALL_TIME_POINTS);

    for i in 0..ALL_TIME_POINTS {
        let value = match i {
            0 => atl,
            ALL_TIME_PEAK => ath,
            i if i == last => price,
            _ => {
                let base = if i < ALL_TIME_PEAK {
                    let t = i as f64 / ALL_TIME_PEAK as f64;
                    atl + (ath - atl) * t * t
                } else {
                    let t = (i - ALL_TIME_PEAK) as f64 / (last - ALL_TIME_PEAK) as f64;
                    ath + (price - ath) * smoothstep(t)
                };
                let noise = (fraction(rng) - 0.5) * 2.0 * ALL_TIME_NOISE;
                (base * (1.0 + noise)).min(ath).max(MIN_PRICE)
            }
        };
        values.push(value);
    }

    values
}

/// Evenly spaced labels across `duration_ms`, the last one at `now`
///
/// Fails with [`ChartError::InvalidRange`] when the span reaches past the representable
/// calendar.
pub fn generate_labels(
    points: usize,
    duration_ms: i64,
    format: LabelFormat,
    now: DateTime<Utc>,
) -> Result<Vec<String>, ChartError> {
    let step_ms = duration_ms as f64 / points.saturating_sub(1).max(1) as f64;

    (0..points)
        .map(|i| {
            let offset_ms = ((points - 1 - i) as f64 * step_ms).round() as i64;
            now.checked_sub_signed(Duration::milliseconds(offset_ms))
                .map(|timestamp| format.format(timestamp))
                .ok_or_else(|| {
                    ChartError::InvalidRange(format!(
                        "a {}ms span cannot be labelled back from {}",
                        duration_ms, now
                    ))
                })
        })
        .collect()
}

/// Derive candles from closes, drawing two fractions per candle for the wicks
///
/// The first candle opens at `close * (1 - trend_step)`, every other one at the previous
/// close. `high >= max(open, close)`, `low <= min(open, close)` and every field is floored
/// at [`MIN_PRICE`].
pub fn derive_ohlc<R: RngCore + ?Sized>(
    rng: &mut R,
    values: &[f64],
    volatility: f64,
    trend_step: f64,
) -> Vec<OhlcCandle> {
    values
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i > 0 { values[i - 1] } else { close * (1.0 - trend_step) };
            let r1 = fraction(rng);
            let r2 = fraction(rng);

            let spread = (close - open).abs() + close * volatility * 0.5;
            let high = open.max(close) + spread * r1 * 0.5;
            let low = open.min(close) - spread * r2 * 0.5;

            OhlcCandle {
                open: open.max(MIN_PRICE),
                high: high.max(open.max(close)),
                low: low.max(MIN_PRICE),
                close: close.max(MIN_PRICE),
            }
        })
        .collect()
}

/// Pick the right generator for a catalogue coin
///
/// `ALL` uses the all-time generator when both landmarks are known and falls back to the
/// plain range walk otherwise.
pub fn series_for_coin(
    coin: &Coin,
    range: TimeRange,
    ranges: &RangeCatalog,
    now: DateTime<Utc>,
) -> Result<GeneratedSeries, ChartError> {
    match (range, coin.all_time_bounds()) {
        (TimeRange::All, Some((high, low))) => {
            generate_all_time_series(ranges, &coin.id, coin.price, high, low, now)
        }
        _ => generate_range_series(ranges, &coin.id, coin.price, coin.change24h, range, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::range::{RangeConfig, MS_PER_DAY};
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap()
    }

    fn assert_candles_valid(series: &GeneratedSeries) {
        for candle in &series.ohlc {
            assert!(candle.high >= candle.open.max(candle.close), "{:?}", candle);
            assert!(candle.low <= candle.open.min(candle.close), "{:?}", candle);
            assert!(candle.low >= MIN_PRICE);
            assert!(candle.open >= MIN_PRICE && candle.close >= MIN_PRICE);
        }
    }

    #[test]
    fn test_bitcoin_seven_days() {
        let ranges = RangeCatalog::standard();
        let series =
            generate_range_series(&ranges, "bitcoin", 68245.12, 2.14, TimeRange::SevenDays, fixed_now()).unwrap();

        assert_eq!(series.values.len(), 36);
        assert_eq!(series.labels.len(), 36);
        assert_eq!(series.ohlc.len(), 36);
        assert_eq!(series.values[35], 68245.12);
        assert_eq!(series.labels[35], "Mar 5, 3 PM");
        assert_eq!(series.labels[0], "Feb 27, 3 PM");
        assert_candles_valid(&series);
    }

    #[test]
    fn test_first_step_follows_lcg() {
        let ranges = RangeCatalog::standard();
        let price = 100.0;
        let change = 5.0;
        let series = generate_range_series(&ranges, "abc", price, change, TimeRange::OneDay, fixed_now()).unwrap();

        let (_, first_fraction) = Lcg::next(seed_from_id("abc", 0));
        let start = price * (1.0 - change / 100.0);
        let expected = start * (1.0 + change / 100.0 / 24.0 + (first_fraction - 0.5) * 0.005);
        assert!((series.values[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_every_range_has_configured_length() {
        let ranges = RangeCatalog::standard();
        for (range, config) in ranges.iter() {
            let series = generate_range_series(&ranges, "ethereum", 3489.77, -1.08, *range, fixed_now()).unwrap();
            assert_eq!(series.values.len(), config.points);
            assert_eq!(series.labels.len(), config.points);
            assert_eq!(series.ohlc.len(), config.points);
            assert_eq!(series.last_value(), Some(3489.77));
        }
    }

    #[test]
    fn test_ranges_are_decorrelated() {
        let ranges = RangeCatalog::standard();
        let a = generate_range_series(&ranges, "solana", 161.43, 4.62, TimeRange::ThirtyDays, fixed_now()).unwrap();
        let b = generate_range_series(&ranges, "solana", 161.43, 4.62, TimeRange::NinetyDays, fixed_now()).unwrap();
        assert_ne!(a.values[0], b.values[0]);
    }

    #[test]
    fn test_custom_catalog_injection() {
        let config = RangeConfig::new(2, MS_PER_DAY, LabelFormat::Time, 0.2).unwrap();
        let ranges = RangeCatalog::new(vec![(TimeRange::OneDay, config)]).unwrap();
        let series = generate_range_series(&ranges, "x", 2.0, 0.0, TimeRange::OneDay, fixed_now()).unwrap();
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.labels, vec!["3:00 PM".to_string(), "3:00 PM".to_string()]);

        let missing = generate_range_series(&ranges, "x", 2.0, 0.0, TimeRange::OneYear, fixed_now());
        assert!(matches!(missing, Err(ChartError::UnknownRange(_))));
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let ranges = RangeCatalog::standard();
        let now = fixed_now();
        assert!(generate_range_series(&ranges, "a", f64::NAN, 0.0, TimeRange::OneDay, now).is_err());
        assert!(generate_range_series(&ranges, "a", -5.0, 0.0, TimeRange::OneDay, now).is_err());
        assert!(generate_range_series(&ranges, "a", 5.0, f64::INFINITY, TimeRange::OneDay, now).is_err());
        assert!(matches!(
            generate_all_time_series(&ranges, "a", 5.0, 1.0, 10.0, now),
            Err(ChartError::InvertedBounds { .. })
        ));
        assert!(generate_all_time_series(&ranges, "a", 5.0, 0.0, 0.0, now).is_err());
    }

    #[test]
    fn test_all_time_anchors() {
        let ranges = RangeCatalog::standard();
        let series = generate_all_time_series(&ranges, "bitcoin", 68245.12, 69000.0, 65.0, fixed_now()).unwrap();

        assert_eq!(series.values.len(), ALL_TIME_POINTS);
        assert_eq!(series.labels.len(), ALL_TIME_POINTS);
        assert_eq!(series.ohlc.len(), ALL_TIME_POINTS);
        assert_eq!(series.values[0], 65.0);
        assert_eq!(series.values[ALL_TIME_PEAK], 69000.0);
        assert_eq!(series.values[59], 68245.12);
        assert!(series.values.iter().all(|v| *v <= 69000.0 && *v >= MIN_PRICE));
        assert_eq!(series.labels[59], "Mar 24");
        assert_candles_valid(&series);
    }

    #[test]
    fn test_all_time_shape_rises_then_falls() {
        let ranges = RangeCatalog::standard();
        let series = generate_all_time_series(&ranges, "cardano", 0.74, 3.1, 0.02, fixed_now()).unwrap();
        // Noise is ±4%, the quadratic ramp dominates between a quarter and the peak
        assert!(series.values[10] < series.values[30]);
        assert!(series.values[30] < series.values[ALL_TIME_PEAK]);
        assert!(series.values[50] < series.values[ALL_TIME_PEAK]);
    }

    #[test]
    fn test_all_time_is_deterministic() {
        let ranges = RangeCatalog::standard();
        let a = generate_all_time_series(&ranges, "dogecoin", 0.15, 0.74, 0.0002, fixed_now()).unwrap();
        let b = generate_all_time_series(&ranges, "dogecoin", 0.15, 0.74, 0.0002, fixed_now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_series_for_coin_picks_generator() {
        let ranges = RangeCatalog::standard();
        let mut coin = Coin {
            id: "bitcoin".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            price: 68245.12,
            change24h: 2.14,
            market_cap: 0.0,
            volume24h: 0.0,
            all_time_high: Some(69000.0),
            all_time_low: Some(65.0),
        };
        let all_time = series_for_coin(&coin, TimeRange::All, &ranges, fixed_now()).unwrap();
        assert_eq!(all_time.values[0], 65.0);

        coin.all_time_low = None;
        let walk = series_for_coin(&coin, TimeRange::All, &ranges, fixed_now()).unwrap();
        let expected =
            generate_range_series(&ranges, "bitcoin", 68245.12, 2.14, TimeRange::All, fixed_now()).unwrap();
        assert_eq!(walk, expected);
    }

    #[test]
    fn test_derive_ohlc_with_any_source() {
        let mut rng = StdRng::seed_from_u64(9);
        let values = vec![MIN_PRICE, 1.0, 0.5, 200.0, MIN_PRICE];
        let candles = derive_ohlc(&mut rng, &values, 0.3, -2.0);
        assert_eq!(candles.len(), values.len());
        assert_eq!(candles[1].open, MIN_PRICE);
        assert_eq!(candles[2].open, 1.0);
        for candle in &candles {
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
            assert!(candle.low >= MIN_PRICE);
        }
    }

    #[test]
    fn test_labels_single_point() {
        let labels = generate_labels(1, MS_PER_DAY, LabelFormat::Day, fixed_now()).unwrap();
        assert_eq!(labels, vec!["Mar 5".to_string()]);
    }

    #[test]
    fn test_span_past_calendar_is_an_error() {
        let config = RangeConfig::new(2, i64::MAX / 2, LabelFormat::MonthYear, 0.1).unwrap();
        let ranges = RangeCatalog::new(vec![(TimeRange::All, config)]).unwrap();

        let walk = generate_range_series(&ranges, "bitcoin", 68245.12, 2.14, TimeRange::All, fixed_now());
        assert!(matches!(walk, Err(ChartError::InvalidRange(_))));

        let all_time = generate_all_time_series(&ranges, "bitcoin", 68245.12, 69000.0, 65.0, fixed_now());
        assert!(matches!(all_time, Err(ChartError::InvalidRange(_))));
    }

    #[test]
    fn test_price_below_floor_is_rejected() {
        let ranges = RangeCatalog::standard();
        let walk = generate_range_series(&ranges, "dust", MIN_PRICE / 2.0, 0.0, TimeRange::OneDay, fixed_now());
        assert!(matches!(walk, Err(ChartError::InvalidPrice { field: "price", .. })));

        let all_time = generate_all_time_series(&ranges, "dust", 0.5, 1.0, 0.00005, fixed_now());
        assert!(matches!(all_time, Err(ChartError::InvalidPrice { field: "all-time low", .. })));

        // Exactly at the floor the pinned close and its candle agree
        let series = generate_range_series(&ranges, "dust", MIN_PRICE, 0.0, TimeRange::OneDay, fixed_now()).unwrap();
        let last = series.ohlc.last().unwrap();
        assert_eq!(series.last_value(), Some(last.close));
    }

    proptest! {
        #[test]
        fn range_series_invariants(
            id in "[a-z0-9-]{0,16}",
            price in 0.0001f64..200_000.0,
            change in -99.0f64..500.0,
            range_index in 0usize..6,
        ) {
            let ranges = RangeCatalog::standard();
            let range = TimeRange::ALL_RANGES[range_index];
            let points = ranges.get(range).unwrap().1.points;

            let a = generate_range_series(&ranges, &id, price, change, range, fixed_now()).unwrap();
            let b = generate_range_series(&ranges, &id, price, change, range, fixed_now()).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.values.len(), points);
            prop_assert_eq!(a.labels.len(), points);
            prop_assert_eq!(a.ohlc.len(), points);
            prop_assert_eq!(a.values[points - 1], price);
            prop_assert!(a.values.iter().all(|v| *v >= MIN_PRICE));
            for c in &a.ohlc {
                prop_assert!(c.high >= c.open.max(c.close));
                prop_assert!(c.low <= c.open.min(c.close));
                prop_assert!(c.low >= MIN_PRICE && c.open >= MIN_PRICE && c.close >= MIN_PRICE);
            }
        }

        #[test]
        fn all_time_series_invariants(
            id in "[a-z]{1,12}",
            low in 0.0001f64..100.0,
            span in 0.0f64..50_000.0,
            position in 0.0f64..=1.0,
        ) {
            let high = low + span;
            let price = low + span * position;
            let series = generate_all_time_series(&RangeCatalog::standard(), &id, price, high, low, fixed_now()).unwrap();

            prop_assert_eq!(series.values.len(), ALL_TIME_POINTS);
            prop_assert_eq!(series.values[0], low);
            prop_assert_eq!(series.values[ALL_TIME_PEAK], high);
            prop_assert_eq!(series.values[ALL_TIME_POINTS - 1], price);
            prop_assert!(series.values.iter().all(|v| *v >= MIN_PRICE && *v <= high));
            for c in &series.ohlc {
                prop_assert!(c.high >= c.open.max(c.close));
                prop_assert!(c.low <= c.open.min(c.close));
                prop_assert!(c.low >= MIN_PRICE);
            }
        }
    }
}
