//! The authenticated request dispatcher and its collaborators.
//!
//! Every backend call goes through [`Dispatcher`]: it attaches the bearer
//! token, and on a first 401 runs one single-flight refresh (see
//! [`RefreshCoordinator`]) before replaying the request once.

pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod transport;

pub use coordinator::{Admission, PendingTicket, RefreshCoordinator, RefreshLease, RefreshResult};
pub use dispatcher::{DispatchPolicy, Dispatcher};
pub use error::{ApiError, DispatchError};
pub use request::ApiRequest;
pub use transport::{
    check_envelope, unwrap_envelope, HttpTransport, Transport, TransportResponse,
    CORRELATION_ID_HEADER,
};
