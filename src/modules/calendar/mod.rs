//! Calendar reference data: academic years, learning types, study years,
//! groups, disciplines, teachers and classrooms.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
