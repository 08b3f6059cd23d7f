//! Incremental sliding-window state.
//!
//! Keeps three views of the same window in lockstep: a FIFO of arrival
//! order, an ascending multiset for order statistics, and running sums for
//! moments. Insert and evict are both O(log n) to locate plus O(n) to
//! shift, which beats re-sorting per step by a wide margin at the window
//! sizes in use.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::window::stats::{median_of_sorted, population_stddev};

#[derive(Debug, Clone)]
pub struct WindowState {
    capacity: usize,
    queue: VecDeque<f64>,
    sorted: Vec<f64>,
    sum: f64,
    sum_squares: f64,
}

impl WindowState {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidWindow);
        }
        Ok(Self {
            capacity,
            queue: VecDeque::with_capacity(capacity + 1),
            sorted: Vec::with_capacity(capacity + 1),
            sum: 0.0,
            sum_squares: 0.0,
        })
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True once the window has seen at least `capacity` values.
    pub fn is_full(&self) -> bool {
        self.queue.len() == self.capacity
    }

    /// Push a value, evicting the oldest once past capacity.
    pub fn insert(&mut self, value: f64) -> Result<()> {
        let at = self.sorted.partition_point(|&existing| existing <= value);
        self.sorted.insert(at, value);
        self.queue.push_back(value);
        self.sum += value;
        self.sum_squares += value * value;

        if self.queue.len() > self.capacity {
            let leaving = match self.queue.pop_front() {
                Some(leaving) => leaving,
                None => {
                    return Err(Error::InternalInconsistency(
                        "window queue empty during eviction".to_string(),
                    ))
                }
            };
            self.sum -= leaving;
            self.sum_squares -= leaving * leaving;
            let at = self.sorted.partition_point(|&existing| existing < leaving);
            if self.sorted.get(at) != Some(&leaving) {
                return Err(Error::InternalInconsistency(format!(
                    "value {leaving} missing from the sorted window"
                )));
            }
            self.sorted.remove(at);
        }
        Ok(())
    }

    pub fn median(&self) -> Option<f64> {
        median_of_sorted(&self.sorted)
    }

    pub fn stddev_population(&self) -> Result<f64> {
        population_stddev(self.sum, self.sum_squares, self.queue.len())
    }

    /// Percentile rank of `value` within the window, in `[0, 100]`. Ties
    /// average their ranks. A single-element window pins to 50. `None` on
    /// an empty window.
    pub fn percentile_of(&self, value: f64) -> Option<f64> {
        let size = self.sorted.len();
        if size == 0 {
            return None;
        }
        if size == 1 {
            return Some(50.0);
        }
        let left = self.sorted.partition_point(|&existing| existing < value);
        let right = self.sorted.partition_point(|&existing| existing <= value);
        let rank_low = (left + 1) as f64;
        let rank_high = right as f64;
        let avg_rank = (rank_low + rank_high) / 2.0;
        Some(100.0 * (avg_rank - 1.0) / (size - 1) as f64)
    }

    /// The window contents in ascending order.
    pub fn snapshot(&self) -> &[f64] {
        &self.sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(WindowState::new(0), Err(Error::InvalidWindow)));
    }

    #[test]
    fn evicts_in_arrival_order() {
        let mut window = WindowState::new(3).unwrap();
        for value in [5.0, 1.0, 3.0, 2.0] {
            window.insert(value).unwrap();
        }
        // 5.0 arrived first and is gone even though it is the largest.
        assert_eq!(window.snapshot(), &[1.0, 2.0, 3.0]);
        assert_eq!(window.median(), Some(2.0));
    }

    #[test]
    fn duplicate_eviction_removes_one_copy() {
        let mut window = WindowState::new(2).unwrap();
        for value in [4.0, 4.0, 4.0] {
            window.insert(value).unwrap();
        }
        assert_eq!(window.snapshot(), &[4.0, 4.0]);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn running_sums_track_the_window() {
        let mut window = WindowState::new(2).unwrap();
        for value in [1.0, 2.0, 3.0] {
            window.insert(value).unwrap();
        }
        // Window is now {2, 3}: mean 2.5, variance 0.25.
        assert!((window.stddev_population().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn percentile_averages_tied_ranks() {
        let mut window = WindowState::new(5).unwrap();
        for value in [1.0, 2.0, 2.0, 2.0, 3.0] {
            window.insert(value).unwrap();
        }
        assert_eq!(window.percentile_of(1.0), Some(0.0));
        assert_eq!(window.percentile_of(3.0), Some(100.0));
        assert_eq!(window.percentile_of(2.0), Some(50.0));
    }

    #[test]
    fn singleton_window_pins_to_fifty() {
        let mut window = WindowState::new(4).unwrap();
        window.insert(7.0).unwrap();
        assert_eq!(window.percentile_of(7.0), Some(50.0));
    }

    #[test]
    fn empty_window_has_no_statistics() {
        let window = WindowState::new(4).unwrap();
        assert_eq!(window.median(), None);
        assert_eq!(window.percentile_of(1.0), None);
        assert!(window.is_empty());
    }
}
