#![allow(clippy::needless_range_loop)]

pub mod detectors;
pub mod utilities;

#[cfg(test)]
mod _rayon_two_worker_pool {
    use ctor::ctor;
    use rayon::ThreadPoolBuilder;

    #[ctor]
    fn init_rayon_pool() {
        // Two workers are enough to exercise row stealing in the batch tests
        // without oversubscribing the test runner.
        let _ = ThreadPoolBuilder::new().num_threads(2).build_global();
    }
}

pub mod bindings {
    #[cfg(feature = "python")]
    pub mod python;
}
