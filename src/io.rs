//! Reading and writing of volumes and rendered images.

pub mod raw;
