//! Shared request plumbing for the upstream clients.

use ldpsync_protocol::{FaultKind, HttpClient, HttpRequest, HttpResponse, UpstreamFault};
use tracing::{debug, warn};

/// Sends a request, returning early from the enclosing client method with an
/// `Upstream::Failed` on transport failure.
macro_rules! send {
    ($http:expr, $request:expr) => {
        match $crate::exchange::exchange(&$http, $request) {
            Ok(response) => response,
            Err(fault) => return Ok(fault.into()),
        }
    };
}

/// Executes one request, mapping transport failures to gateway statuses.
pub(crate) fn exchange<H: HttpClient + ?Sized>(
    http: &H,
    request: HttpRequest,
) -> Result<HttpResponse, UpstreamFault> {
    let method = request.method;
    let url = request.url.clone();
    match http.execute(request) {
        Ok(response) => {
            debug!(%method, %url, status = response.status, "upstream response");
            Ok(response)
        }
        Err(error) => {
            warn!(%method, %url, error = %error, "transport failure");
            Err(UpstreamFault {
                kind: FaultKind::Failed,
                status: error.gateway_status(),
                message: error.to_string(),
            })
        }
    }
}

/// Builds a fault from a response, keeping its status and body.
pub(crate) fn fault(kind: FaultKind, response: &HttpResponse) -> UpstreamFault {
    UpstreamFault {
        kind,
        status: response.status,
        message: response.text(),
    }
}
