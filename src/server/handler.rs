use crate::http::request::Request;
use crate::http::response::Response;

/// Receives each completed request together with its response handle.
///
/// Called synchronously, once per connection. The handler answers by calling
/// [`Response::send`]; a handler that returns without sending gets its
/// connection closed with no reply.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: &Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    fn handle(&self, req: &Request, res: &mut Response) {
        self(req, res)
    }
}
