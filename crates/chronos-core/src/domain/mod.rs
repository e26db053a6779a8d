//! 스크리너 도메인 모델.

mod cache;
mod candidate;
mod market_hours;
mod ohlcv;
mod signal;
mod template;
mod universe;

pub use cache::*;
pub use candidate::*;
pub use market_hours::*;
pub use ohlcv::*;
pub use signal::*;
pub use template::*;
pub use universe::*;
