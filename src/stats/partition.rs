//! Population partition for the pie chart.
//!
//! Source data is not always consistent (deaths + recoveries can exceed cases,
//! cases can exceed a stale population figure). Negative buckets are clamped
//! to zero; in that case the slices no longer sum to the population.

use crate::domain::{PartitionSlice, PopulationPartition, SliceKind};

pub fn partition_population(
    population: u64,
    cases: u64,
    deaths: u64,
    recovered: u64,
) -> PopulationPartition {
    let active = cases.saturating_sub(deaths).saturating_sub(recovered);
    let unaffected = population.saturating_sub(cases);

    PopulationPartition {
        population,
        slices: [
            slice(SliceKind::Unaffected, unaffected),
            slice(SliceKind::Active, active),
            slice(SliceKind::Recovered, recovered),
            slice(SliceKind::Deaths, deaths),
        ],
    }
}

fn slice(kind: SliceKind, value: u64) -> PartitionSlice {
    PartitionSlice {
        kind,
        label: kind.label().to_string(),
        value,
        color: kind.color().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(p: &PopulationPartition) -> [u64; 4] {
        [
            p.slices[0].value,
            p.slices[1].value,
            p.slices[2].value,
            p.slices[3].value,
        ]
    }

    #[test]
    fn consistent_inputs_sum_to_population() {
        let p = partition_population(1_000, 100, 5, 80);
        assert_eq!(values(&p), [900, 15, 80, 5]);
        assert_eq!(p.total(), 1_000);

        let kinds: Vec<SliceKind> = p.slices.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SliceKind::Unaffected, SliceKind::Active, SliceKind::Recovered, SliceKind::Deaths]
        );
        assert_eq!(p.slices[0].color, "#FBEC85");
        assert_eq!(p.slices[3].label, "Deaths");
    }

    #[test]
    fn billion_scale_is_exact() {
        let population = 1_425_671_352u64;
        let p = partition_population(population, 99_310_000, 122_000, 84_413_500);
        assert_eq!(p.total(), population);
        assert_eq!(p.slices[1].value, 99_310_000 - 122_000 - 84_413_500);
    }

    #[test]
    fn inconsistent_inputs_are_clamped() {
        // deaths + recovered > cases
        let p = partition_population(1_000, 100, 30, 90);
        assert_eq!(p.slices[1].value, 0);

        // cases > population
        let p = partition_population(50, 100, 1, 2);
        assert_eq!(p.slices[0].value, 0);
        assert_eq!(p.slices[1].value, 97);
    }

    #[test]
    fn share_is_percent_of_population() {
        let p = partition_population(200, 100, 10, 40);
        assert!((p.share(&p.slices[0]) - 50.0).abs() < 1e-9);
        assert!((p.share(&p.slices[1]) - 25.0).abs() < 1e-9);

        let empty = partition_population(0, 0, 0, 0);
        assert_eq!(empty.share(&empty.slices[0]), 0.0);
    }
}
