//! CP/M 2.2 File Control Block translation layer
//!
//! This crate maps CP/M's disk-file addressing model onto a host filesystem:
//! - `Fcb`: the 36-byte File Control Block, bit-exact with guest memory
//! - Name parsing (`Fcb::parse`) from command-line style filenames
//! - Sequential and random file positions
//! - Wildcard matching and recursive directory search
//!
//! # Architecture
//!
//! Everything except directory search is a pure function of an `Fcb` value:
//! - `Fcb`: owned value type with accessors per field and per position view
//! - `find_matches`: blocking host directory walk yielding `FindResult`s
//! - `DriveMap`: drive letters (A-P) to host directories
//!
//! The Z80 interpreter and BDOS dispatcher that use this layer live outside
//! this crate.

pub mod drives;
pub mod error;
pub mod fcb;
pub mod find;

pub use drives::{drive_index, drive_letter, DriveMap, DriveMapConfig};
pub use error::{CpmError, CpmResult};
pub use fcb::{Fcb, FCB_SIZE, RECORD_SIZE};
pub use find::{find_matches, FindResult};
