//! Snippet registry and production
//!
//! Snippets are registered once by the import pipeline and produced any
//! number of times. Production walks a fragment, copies literal elements,
//! substitutes `{{variable}}` placeholders and executes directives:
//!
//! ```xml
//! <ul class="menu">
//!     <dht:for-each list="items">
//!         <li dht:onclick="select">{{label}}</li>
//!     </dht:for-each>
//!     <dht:if test="{{more}} = true">
//!         <dht:then><dht:insert-snippet name="more-link"/></dht:then>
//!         <dht:else><dht:call-function name="hideMore"/></dht:else>
//!     </dht:if>
//! </ul>
//! ```

mod interpolate;
mod owner;
mod producer;
mod registry;

pub use interpolate::{interpolate, interpolate_for_expression, lookup, stringify};
pub use owner::Owner;
pub use producer::{ProduceError, Producer};
pub use registry::SnippetRegistry;
