/// Plain text snapshots of the totals
pub mod reporter;
