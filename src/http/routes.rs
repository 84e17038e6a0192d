use crate::app::AppContext;
use axum::Router;

/// A group of routes mounted into the application as one unit
///
/// Every Verdant resource (waste points, devices, initiatives, ...) is a
/// `RouteModule`. Handlers take `State<AppContext>`; the state itself is
/// provided once by the `App` after all modules are registered.
pub trait RouteModule {
    fn routes(&self) -> Router<AppContext>
    where
        Self: Sized;

    /// Path prefix the module's router is nested under
    fn prefix(&self) -> Option<&str> {
        None
    }

    fn register(self, router: Router<AppContext>) -> Router<AppContext>
    where
        Self: Sized,
    {
        let routes = self.routes();

        if let Some(prefix) = self.prefix() {
            router.nest(prefix, routes)
        } else {
            router.merge(routes)
        }
    }
}
