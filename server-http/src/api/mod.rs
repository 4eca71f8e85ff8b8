pub mod requests;
pub mod responses;

pub use requests::{RpcRequest, TransactionParams, ADD_TRANSACTION_METHOD};
pub use responses::{DataResponse, ErrorResponse, HealthResponse, ItemsResponse, ResultResponse};
