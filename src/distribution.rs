use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One of the four fixed, non-overlapping age ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    Under20,
    From20To40,
    From40To60,
    Over60,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::Under20,
        AgeBucket::From20To40,
        AgeBucket::From40To60,
        AgeBucket::Over60,
    ];

    /// `< 20`, `20..=40`, `41..=60`, `> 60`. Forty belongs to the second range.
    pub fn classify(age: i64) -> Self {
        if age < 20 {
            AgeBucket::Under20
        } else if age <= 40 {
            AgeBucket::From20To40
        } else if age <= 60 {
            AgeBucket::From40To60
        } else {
            AgeBucket::Over60
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under20 => "< 20",
            AgeBucket::From20To40 => "20 to 40",
            AgeBucket::From40To60 => "40 to 60",
            AgeBucket::Over60 => "> 60",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketShare {
    pub bucket: AgeBucket,
    pub count: usize,
    pub percent: String,
}

/// Share of ages per bucket, always in [`AgeBucket::ALL`] order.
///
/// Serializes as a JSON object keyed by bucket label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeDistribution {
    shares: Vec<BucketShare>,
}

impl AgeDistribution {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn shares(&self) -> &[BucketShare] {
        &self.shares
    }

    /// Percentage string for a bucket label such as `"20 to 40"`.
    pub fn percent(&self, label: &str) -> Option<&str> {
        self.shares
            .iter()
            .find(|share| share.bucket.label() == label)
            .map(|share| share.percent.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.shares
            .iter()
            .map(|share| (share.bucket.label(), share.percent.as_str()))
    }
}

impl Serialize for AgeDistribution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.shares.len()))?;
        for (label, percent) in self.iter() {
            map.serialize_entry(label, percent)?;
        }
        map.end()
    }
}

/// Buckets `ages` and reports each bucket's share with two decimals.
///
/// An empty slice produces an empty report.
pub fn distribution(ages: &[i64]) -> AgeDistribution {
    if ages.is_empty() {
        return AgeDistribution::default();
    }
    let mut counts = [0usize; 4];
    for &age in ages {
        counts[AgeBucket::classify(age) as usize] += 1;
    }
    let total = ages.len() as f64;
    let shares = AgeBucket::ALL
        .iter()
        .zip(counts)
        .map(|(bucket, count)| {
            let percent = (count as f64 / total) * 100.0;
            BucketShare {
                bucket: *bucket,
                count,
                percent: format!("{percent:.2}%"),
            }
        })
        .collect();
    AgeDistribution { shares }
}
