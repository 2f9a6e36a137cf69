//! Time bucketing for weekly, monthly and yearly report windows
//!
//! Calendar boundaries are computed in a fixed UTC offset and returned as
//! UTC instants, so the result only depends on the explicit `as_of`.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
    Weekday,
};

use crate::types::{Bucket, Granularity};

/// Upper bound on up-front allocation; `count` is caller-controlled
const MAX_PREALLOC: usize = 512;

/// Calendar conventions for bucket boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketPlan {
    week_start: Weekday,
    utc_offset: FixedOffset,
}

impl Default for BucketPlan {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
            utc_offset: Utc.fix(),
        }
    }
}

impl BucketPlan {
    pub fn new(week_start: Weekday, utc_offset: FixedOffset) -> Self {
        Self {
            week_start,
            utc_offset,
        }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// The last `count` buckets, oldest first, ending with the period that
    /// contains `as_of`. The final bucket is cut off at `as_of`.
    pub fn buckets(
        &self,
        granularity: Granularity,
        count: usize,
        as_of: DateTime<Utc>,
    ) -> Vec<Bucket> {
        if count == 0 {
            return Vec::new();
        }

        let today = as_of.with_timezone(&self.utc_offset).date_naive();
        let Some(current) = self.period_start(granularity, today) else {
            return Vec::new();
        };

        let mut starts = Vec::with_capacity(count.min(MAX_PREALLOC));
        let mut start = current;
        starts.push(start);
        while starts.len() < count {
            match Self::previous_start(granularity, start) {
                Some(prev) => {
                    start = prev;
                    starts.push(start);
                }
                // Ran off the calendar; keep what we have
                None => break,
            }
        }
        starts.reverse();

        let mut buckets = Vec::with_capacity(starts.len());
        for (i, &start_date) in starts.iter().enumerate() {
            let Some(start) = self.to_utc(start_date) else {
                continue;
            };
            let end = match starts.get(i + 1) {
                Some(&next) => match self.to_utc(next) {
                    Some(end) => end,
                    None => continue,
                },
                None => as_of,
            };
            buckets.push(Bucket {
                label: Self::label(granularity, start_date),
                start,
                end,
            });
        }
        buckets
    }

    /// First calendar day of the period containing `date`
    fn period_start(&self, granularity: Granularity, date: NaiveDate) -> Option<NaiveDate> {
        match granularity {
            Granularity::Week => {
                let back = (date.weekday().num_days_from_monday() + 7
                    - self.week_start.num_days_from_monday())
                    % 7;
                date.checked_sub_signed(Duration::days(back as i64))
            }
            Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }

    fn previous_start(granularity: Granularity, start: NaiveDate) -> Option<NaiveDate> {
        match granularity {
            Granularity::Week => start.checked_sub_signed(Duration::days(7)),
            Granularity::Month => start.checked_sub_months(Months::new(1)),
            Granularity::Year => start.checked_sub_months(Months::new(12)),
        }
    }

    fn to_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.utc_offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn label(granularity: Granularity, start: NaiveDate) -> String {
        match granularity {
            Granularity::Week => start.format("%Y-%m-%d").to_string(),
            Granularity::Month => start.format("%Y-%m").to_string(),
            Granularity::Year => start.format("%Y").to_string(),
        }
    }
}

/// Index of the bucket containing `ts`.
///
/// Expects buckets ordered oldest first and non-overlapping, as produced by
/// [`BucketPlan::buckets`].
pub fn locate(buckets: &[Bucket], ts: DateTime<Utc>) -> Option<usize> {
    let idx = buckets.partition_point(|b| b.end <= ts);
    buckets
        .get(idx)
        .filter(|b| b.contains(ts))
        .map(|_| idx)
}
