pub use rollcall_models::attendance::{
    AttendanceMark, AttendanceStatus, HistoryFilterParams, LegacyMarkDto, utc_day_bounds,
};
