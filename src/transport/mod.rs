//! Transport layer: query encoding and response grammar of the rental API.

mod handler_api;
mod number_v2;

pub use handler_api::{
    TransportError, decode_balance_response, decode_number_response, decode_set_status_response,
    decode_status_response, encode_get_balance_query, encode_get_number_query,
    encode_get_status_query, encode_set_status_query,
};
pub use number_v2::decode_number_v2_response;
