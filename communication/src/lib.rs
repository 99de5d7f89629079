mod line_protocol;
mod point;
mod store_connection;

pub use line_protocol::encode_batch;
pub use line_protocol::encode_point;
pub use point::now_unix_nanos;
pub use point::FieldValue;
pub use point::Fields;
pub use point::Point;
pub use point::PointError;
pub use point::Precision;
pub use point::Tags;
pub use point::UnknownPrecision;
pub use store_connection::ConnectionConfig;
pub use store_connection::ConnectionError;
pub use store_connection::StoreConnection;
