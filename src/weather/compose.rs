//! SQL projection builder for weather queries.
//!
//! Both builders walk a fixed table of `(bit, fragment)` pairs and append
//! each selected fragment to the statement, so the projection order is
//! deterministic for any mask. Fragments end with a comma; the trailing one
//! is stripped before the suffix is attached.
//!
//! The static builder targets the pre-aggregated summary tables and is only
//! valid when the requested timezone matches the zone the summaries were
//! computed in (or for raw data, which has no bucketing). The dynamic
//! builder re-buckets the raw table on the fly with `generate_series` in
//! the session's time zone, producing the same aggregate columns.

use super::fields::{Granularity, data, summary};

const STATIC_BASE: &str = "SELECT \
      lower(time_range) AS period_start, \
      upper(time_range) AS period_end,";

const RAW_COLUMNS: &[(u32, &str)] = &[
    (data::TEMPERATURE, " temperature,"),
    (data::HUMIDITY, " humidity,"),
    (data::PRESSURE, " pressure,"),
    (data::LUX, " lux,"),
    (data::UVI, " uvi,"),
    (data::WIND_SPEED, " wind_speed,"),
    (data::WIND_DIRECTION, " wind_direction,"),
    (data::GUST_SPEED, " gust_speed,"),
    (data::GUST_DIRECTION, " gust_direction,"),
    (data::RAINFALL, " rainfall,"),
    (data::SOLAR_IRRADIANCE, " solar_irradiance,"),
];

/// Aggregates present in every summary table.
const SUMMARY_COLUMNS: &[(u32, &str)] = &[
    (summary::AVG_TEMPERATURE, " avg_temperature,"),
    (summary::AVG_HUMIDITY, " avg_humidity,"),
    (summary::AVG_PRESSURE, " avg_pressure,"),
    (summary::SUM_RAINFALL, " sum_rainfall,"),
    (summary::STDDEV_RAINFALL, " stddev_rainfall,"),
    (summary::AVG_WIND_SPEED, " avg_wind_speed,"),
    (summary::AVG_WIND_DIRECTION, " avg_wind_direction,"),
    (summary::STDDEV_WIND_SPEED, " stddev_wind_speed,"),
    (summary::MAX_GUST_SPEED, " max_gust_speed,"),
    (summary::MAX_GUST_DIRECTION, " max_gust_direction,"),
    (summary::AVG_LUX, " avg_lux,"),
    (summary::AVG_UVI, " avg_uvi,"),
    (summary::AVG_SOLAR_IRRADIANCE, " avg_solar_irradiance,"),
];

/// Extremes carried only by the daily, monthly and yearly tables.
const SUMMARY_MINMAX_COLUMNS: &[(u32, &str)] = &[
    (summary::MAX_TEMPERATURE, " max_temperature,"),
    (summary::MIN_TEMPERATURE, " min_temperature,"),
    (summary::STDDEV_TEMPERATURE, " stddev_temperature,"),
    (summary::MAX_HUMIDITY, " max_humidity,"),
    (summary::MIN_HUMIDITY, " min_humidity,"),
    (summary::STDDEV_HUMIDITY, " stddev_humidity,"),
    (summary::MAX_PRESSURE, " max_pressure,"),
    (summary::MIN_PRESSURE, " min_pressure,"),
    (summary::MAX_LUX, " max_lux,"),
    (summary::MAX_UVI, " max_uvi,"),
];

/// Bucket generation in the session's time zone, then a grouped join of the
/// raw table into those buckets.
const DYNAMIC_BASE: &str = "WITH params AS ( \
    SELECT \
        (SELECT station_id FROM stations.stations WHERE name = $1 OR uuid::text = $1) AS station_id, \
        $2::timestamp AS start_ts, \
        $3::timestamp AS end_ts, \
        $4::text AS granularity \
), \
time_ranges AS ( \
    SELECT \
        station_id, \
        granularity, \
        tstzrange( \
            ts, \
            ts + ( \
                CASE granularity \
                    WHEN 'hour' THEN interval '1 hour' \
                    WHEN 'day' THEN interval '1 day' \
                    WHEN 'month' THEN interval '1 month' \
                    WHEN 'year' THEN interval '1 year' \
                END \
            ) \
        ) AS time_range \
    FROM params, \
    generate_series( \
        date_trunc(granularity, start_ts), \
        date_trunc(granularity, end_ts), \
        CASE granularity \
            WHEN 'hour' THEN interval '1 hour' \
            WHEN 'day' THEN interval '1 day' \
            WHEN 'month' THEN interval '1 month' \
            WHEN 'year' THEN interval '1 year' \
        END \
    ) AS ts \
) \
SELECT \
      lower(d.time_range) AS period_start, \
      upper(d.time_range) AS period_end, \
      d.granularity,";

const DYNAMIC_SUFFIX: &str = " FROM time_ranges d \
LEFT JOIN weather.weather_data wd \
   ON wd.station_id = d.station_id \
   AND wd.time_range && d.time_range \
GROUP BY d.station_id, d.time_range, d.granularity \
ORDER BY d.time_range";

/// On-the-fly renditions of the summary columns. Expressions yielding
/// `numeric` are cast down to `float8` so the projected columns decode the
/// same as their summary-table counterparts.
const DYNAMIC_COLUMNS: &[(u32, &str)] = &[
    (summary::AVG_TEMPERATURE, " AVG(wd.temperature) AS avg_temperature,"),
    (summary::MAX_TEMPERATURE, " MAX(wd.temperature) AS max_temperature,"),
    (summary::MIN_TEMPERATURE, " MIN(wd.temperature) AS min_temperature,"),
    (summary::STDDEV_TEMPERATURE, " STDDEV(wd.temperature) AS stddev_temperature,"),
    (summary::AVG_HUMIDITY, " AVG(wd.humidity) AS avg_humidity,"),
    (summary::MAX_HUMIDITY, " MAX(wd.humidity) AS max_humidity,"),
    (summary::MIN_HUMIDITY, " MIN(wd.humidity) AS min_humidity,"),
    (summary::STDDEV_HUMIDITY, " STDDEV(wd.humidity) AS stddev_humidity,"),
    (summary::AVG_PRESSURE, " AVG(wd.pressure) AS avg_pressure,"),
    (summary::MAX_PRESSURE, " MAX(wd.pressure) AS max_pressure,"),
    (summary::MIN_PRESSURE, " MIN(wd.pressure) AS min_pressure,"),
    (summary::SUM_RAINFALL, " SUM(wd.rainfall) AS sum_rainfall,"),
    (summary::STDDEV_RAINFALL, " STDDEV(wd.rainfall) AS stddev_rainfall,"),
    (summary::AVG_WIND_SPEED, " AVG(wd.wind_speed) AS avg_wind_speed,"),
    // Vector-sum average: NULL when the bucket holds no wind observations.
    (
        summary::AVG_WIND_DIRECTION,
        " MOD( \
          CAST(DEGREES( \
            ATAN2( \
              SUM(CAST(wd.wind_speed AS numeric) * SIN(RADIANS(CAST(wd.wind_direction AS numeric)))), \
              SUM(CAST(wd.wind_speed AS numeric) * COS(RADIANS(CAST(wd.wind_direction AS numeric)))) \
            ) \
          ) AS numeric) + 360, 360 \
        )::float8 AS avg_wind_direction,",
    ),
    (summary::STDDEV_WIND_SPEED, " STDDEV(wd.wind_speed) AS stddev_wind_speed,"),
    (
        summary::WIND_RUN,
        " SUM(wd.wind_speed * EXTRACT(EPOCH FROM (upper(wd.time_range) - \
         lower(wd.time_range))))::float8 AS wind_run,",
    ),
    (summary::MAX_GUST_SPEED, " MAX(wd.gust_speed) AS max_gust_speed,"),
    // Direction of the strongest gust in the bucket, not the largest
    // direction value.
    (
        summary::MAX_GUST_DIRECTION,
        " (SELECT wd2.gust_direction FROM weather.weather_data wd2 WHERE \
         wd2.station_id = d.station_id AND wd2.time_range && d.time_range ORDER \
         BY wd2.gust_speed DESC LIMIT 1) AS max_gust_direction,",
    ),
    (summary::MAX_LUX, " MAX(wd.lux) AS max_lux,"),
    (summary::AVG_LUX, " AVG(wd.lux) AS avg_lux,"),
    (summary::MAX_UVI, " MAX(wd.uvi) AS max_uvi,"),
    (summary::AVG_UVI, " AVG(wd.uvi) AS avg_uvi,"),
    (summary::AVG_SOLAR_IRRADIANCE, " AVG(wd.solar_irradiance) AS avg_solar_irradiance,"),
];

fn append_columns(sql: &mut String, fields: u32, table: &[(u32, &str)]) {
    for &(bit, fragment) in table {
        if fields & bit != 0 {
            sql.push_str(fragment);
        }
    }
}

fn trim_trailing_comma(sql: &mut String) {
    if sql.ends_with(',') {
        sql.pop();
    }
}

fn table_name(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Raw => "weather.weather_data",
        Granularity::Hour => "weather.weather_hourly_summary",
        Granularity::Day => "weather.weather_daily_summary",
        Granularity::Month => "weather.weather_monthly_summary",
        Granularity::Year => "weather.weather_yearly_summary",
    }
}

/// Projection against the table matching `granularity`, driven by `fields`.
/// Binds `$1` = station reference, `$2` = range start, `$3` = range end.
#[must_use]
pub fn static_query(fields: u32, granularity: Granularity) -> String {
    let mut sql = String::with_capacity(1024);
    sql.push_str(STATIC_BASE);

    match granularity {
        Granularity::Raw => append_columns(&mut sql, fields, RAW_COLUMNS),
        _ => {
            append_columns(&mut sql, fields, SUMMARY_COLUMNS);
            if granularity == Granularity::Day && fields & summary::WIND_RUN != 0 {
                sql.push_str(" wind_run,");
            }
            if matches!(
                granularity,
                Granularity::Day | Granularity::Month | Granularity::Year
            ) {
                append_columns(&mut sql, fields, SUMMARY_MINMAX_COLUMNS);
            }
        }
    }

    trim_trailing_comma(&mut sql);
    sql.push_str(" FROM ");
    sql.push_str(table_name(granularity));
    sql.push_str(
        " WHERE station_id = (SELECT station_id FROM stations.stations \
         WHERE name = $1 OR uuid::text = $1) \
         AND time_range && tstzrange($2, $3) \
         ORDER BY lower(time_range)",
    );
    sql
}

/// On-the-fly aggregation of the raw table into local-timezone buckets.
/// Binds `$1` = station reference, `$2` = range start, `$3` = range end,
/// `$4` = granularity keyword.
#[must_use]
pub fn dynamic_query(fields: u32) -> String {
    let mut sql = String::with_capacity(4096);
    sql.push_str(DYNAMIC_BASE);
    append_columns(&mut sql, fields, DYNAMIC_COLUMNS);
    trim_trailing_comma(&mut sql);
    sql.push_str(DYNAMIC_SUFFIX);
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Positions of the `AS <name>` aliases (or bare column names) actually
    /// projected, in order of appearance before the FROM clause.
    fn projected(sql: &str, names: &[&str]) -> Vec<usize> {
        let head = sql.split(" FROM ").next().unwrap();
        names.iter().filter_map(|n| head.find(n)).collect()
    }

    #[test]
    fn raw_projection_follows_the_mask_in_fixed_order() {
        let sql = static_query(
            data::TEMPERATURE | data::HUMIDITY | data::RAINFALL,
            Granularity::Raw,
        );
        assert!(sql.contains("FROM weather.weather_data"));
        assert!(sql.contains("period_start"));
        assert!(sql.contains("period_end"));
        assert!(sql.contains(" temperature"));
        assert!(sql.contains(" humidity"));
        assert!(sql.contains(" rainfall"));
        assert!(!sql.contains("pressure"));
        assert!(!sql.contains("wind_speed"));

        let order = projected(&sql, &[" temperature", " humidity", " rainfall"]);
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_mask_projects_only_the_period_columns() {
        for granularity in [
            Granularity::Raw,
            Granularity::Hour,
            Granularity::Day,
            Granularity::Month,
            Granularity::Year,
        ] {
            let sql = static_query(0, granularity);
            assert!(
                sql.contains("period_end FROM"),
                "dangling comma in: {sql}"
            );
        }
    }

    #[test]
    fn hourly_summary_excludes_extremes_and_wind_run() {
        let mask = summary::AVG_TEMPERATURE
            | summary::MAX_TEMPERATURE
            | summary::MIN_TEMPERATURE
            | summary::WIND_RUN;
        let sql = static_query(mask, Granularity::Hour);
        assert!(sql.contains("FROM weather.weather_hourly_summary"));
        assert!(sql.contains(" avg_temperature"));
        assert!(!sql.contains("max_temperature"));
        assert!(!sql.contains("min_temperature"));
        assert!(!sql.contains("wind_run"));
    }

    #[test]
    fn daily_summary_carries_wind_run_and_extremes() {
        let mask = summary::AVG_TEMPERATURE
            | summary::MAX_TEMPERATURE
            | summary::MIN_TEMPERATURE
            | summary::WIND_RUN;
        let sql = static_query(mask, Granularity::Day);
        assert!(sql.contains("FROM weather.weather_daily_summary"));
        assert!(sql.contains(" wind_run"));
        assert!(sql.contains(" max_temperature"));
        assert!(sql.contains(" min_temperature"));
    }

    #[test]
    fn monthly_and_yearly_summaries_skip_wind_run() {
        for granularity in [Granularity::Month, Granularity::Year] {
            let sql = static_query(summary::WIND_RUN | summary::MAX_LUX, granularity);
            assert!(!sql.contains("wind_run"));
            assert!(sql.contains(" max_lux"));
        }
    }

    #[test]
    fn summary_table_per_granularity() {
        assert!(static_query(0, Granularity::Month).contains("weather.weather_monthly_summary"));
        assert!(static_query(0, Granularity::Year).contains("weather.weather_yearly_summary"));
    }

    #[test]
    fn dynamic_query_buckets_with_generate_series() {
        let sql = dynamic_query(summary::AVG_TEMPERATURE | summary::SUM_RAINFALL);
        assert!(sql.starts_with("WITH params AS"));
        assert!(sql.contains("generate_series"));
        assert!(sql.contains("date_trunc(granularity, start_ts)"));
        assert!(sql.contains("AVG(wd.temperature) AS avg_temperature"));
        assert!(sql.contains("SUM(wd.rainfall) AS sum_rainfall"));
        assert!(sql.contains("GROUP BY d.station_id, d.time_range, d.granularity"));
        assert!(sql.contains("ORDER BY d.time_range"));
        assert!(!sql.contains("avg_wind_direction"));
    }

    #[test]
    fn dynamic_wind_direction_uses_the_vector_sum() {
        let sql = dynamic_query(summary::AVG_WIND_DIRECTION);
        assert!(sql.contains("ATAN2"));
        assert!(sql.contains("SIN(RADIANS"));
        assert!(sql.contains("COS(RADIANS"));
        assert!(sql.contains("+ 360, 360"));
    }

    #[test]
    fn dynamic_gust_direction_tracks_the_strongest_gust() {
        let sql = dynamic_query(summary::MAX_GUST_DIRECTION);
        assert!(sql.contains("ORDER BY wd2.gust_speed DESC LIMIT 1"));
    }

    #[test]
    fn dynamic_empty_mask_has_no_dangling_comma() {
        let sql = dynamic_query(0);
        assert!(sql.contains("d.granularity FROM time_ranges d"));
    }

    #[test]
    fn every_masked_query_strips_the_trailing_comma() {
        for bit in 0..24 {
            let sql = dynamic_query(1 << bit);
            let head = sql.split(" FROM time_ranges").next().unwrap();
            assert!(!head.trim_end().ends_with(','), "trailing comma for bit {bit}");
        }
    }
}
