use chrono::Utc;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::model::{ReconInput, ReconMeta, ReconResult, Side};
use crate::reconcile::reconcile;

/// Run reconciliation per config. Returns discrepancies + summary.
///
/// Fails before comparing anything if the configured range is inverted, so
/// a caller never sees a partial result.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    if input.left.side() != Side::Left || input.right.side() != Side::Right {
        return Err(ReconError::ConfigValidation(
            "input collections are swapped: expected left then right".into(),
        ));
    }

    let options = config.options()?;
    tracing::info!(
        config = %config.name,
        range = %options.range,
        left = input.left.len(),
        right = input.right.len(),
        "starting reconciliation"
    );

    let detected_at = Utc::now();
    let discrepancies = reconcile(&input.left, &input.right, &options, detected_at);
    let summary = compute_summary(&input.left, &input.right, options.range, &discrepancies);

    tracing::info!(
        left_only = summary.left_only,
        right_only = summary.right_only,
        mismatches = summary.mismatches,
        "reconciliation finished"
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: detected_at.to_rfc3339(),
            range: options.range,
        },
        summary,
        discrepancies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::load_records;
    use crate::model::DiscrepancyKind;

    const CONFIG: &str = r#"
name = "Engine Test"

[range]
lower = 100
upper = 200

[sources.left]
file = "local.csv"
delimiter = ";"
label = "local"

[sources.right]
file = "gcp.csv"
label = "GCP"
"#;

    const LOCAL: &str = "\
ID;CODE_GENDER;FLAG_OWN_CAR;FLAG_OWN_REALTY;AMT_INCOME_TOTAL;NAME_INCOME_TYPE;DAYS_BIRTH;OCCUPATION_TYPE
99;M;Y;Y;1000;Working;-12005;
100;M;Y;Y;427500;Working;-12005;
101;F;N;Y;112500;Pensioner;-21474;
102;F;N;N;270000;Working;-19110;Sales staff
200;M;N;Y;135000;Working;-15000;Laborers
";

    const GCP: &str = "\
ID,CODE_GENDER,FLAG_OWN_CAR,FLAG_OWN_REALTY,AMT_INCOME_TOTAL,NAME_INCOME_TYPE,DAYS_BIRTH,OCCUPATION_TYPE
100,M,Y,Y,427500,Working,-12005,
102,F,N,N,280000,Working,-19110,Sales staff
150,F,Y,N,90000,Working,-10000,Drivers
200,M,N,Y,135000,Working,-15000,Laborers
201,M,N,Y,1,Working,-1,
";

    fn input(config: &ReconConfig) -> ReconInput {
        let required = config.required_columns();
        let load = |side: Side, data: &str| {
            load_records(side, data, config.sources.get(side), &config.key_field, &required)
                .unwrap()
        };
        ReconInput {
            left: load(Side::Left, LOCAL),
            right: load(Side::Right, GCP),
        }
    }

    #[test]
    fn integration_local_vs_gcp() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let result = run(&config, &input(&config)).unwrap();

        assert_eq!(result.meta.config_name, "Engine Test");
        assert_eq!(result.summary.left_only, 1);
        assert_eq!(result.summary.right_only, 1);
        assert_eq!(result.summary.mismatches, 1);
        assert_eq!(result.summary.left_in_range, 4);
        assert_eq!(result.summary.right_in_range, 4);

        let got: Vec<(DiscrepancyKind, i64)> =
            result.discrepancies.iter().map(|d| (d.kind, d.id)).collect();
        assert_eq!(
            got,
            vec![
                (DiscrepancyKind::LeftOnly, 101),
                (DiscrepancyKind::RightOnly, 150),
                (DiscrepancyKind::Mismatch, 102),
            ]
        );

        let left_only = &result.discrepancies[0];
        assert_eq!(left_only.left_snapshot.as_deref(), Some("F|112500|Pensioner"));
        assert_eq!(
            left_only.description,
            "Record ID 101 exists in local but was not found in GCP"
        );

        let mismatch = &result.discrepancies[2];
        assert_eq!(mismatch.left_snapshot.as_deref(), Some("F|270000|-19110|Sales staff"));
        assert_eq!(mismatch.right_snapshot.as_deref(), Some("F|280000|-19110|Sales staff"));
        assert_eq!(mismatch.fields, vec!["AMT_INCOME_TOTAL".to_string()]);
    }

    #[test]
    fn one_timestamp_per_run() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let result = run(&config, &input(&config)).unwrap();
        let first = result.discrepancies[0].detected_at;
        assert!(result.discrepancies.iter().all(|d| d.detected_at == first));
        assert_eq!(result.meta.run_at, first.to_rfc3339());
    }

    #[test]
    fn inverted_range_fails_without_result() {
        let mut config = ReconConfig::from_toml(CONFIG).unwrap();
        config.override_range(Some(300), None);
        let err = run(&config, &input(&config)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn swapped_inputs_rejected() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let ReconInput { left, right } = input(&config);
        let swapped = ReconInput { left: right, right: left };
        assert!(matches!(
            run(&config, &swapped),
            Err(ReconError::ConfigValidation(_))
        ));
    }
}
