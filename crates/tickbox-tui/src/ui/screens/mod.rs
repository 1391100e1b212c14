//! Content rendering for each route.

pub mod dashboard;
pub mod logout;
pub mod signin;
pub mod signup;
