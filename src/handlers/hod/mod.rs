// handlers/hod/mod.rs - HOD handlers (HOD session required)
//
// Route Prefix: /api/hod
// Middleware: require_hod (injects AuthUser)
//
// One file per resource, each exposing list/create/show/update/delete.
pub mod hods;
pub mod profile;
pub mod reports;
pub mod students;
pub mod subjects;
pub mod teachers;
