//! # HTTP 协作者
//!
//! 网关只依赖 [`HttpClient`] 抽象；默认实现基于 `reqwest`。

mod client;
mod reqwest_client;

pub use client::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Params};
pub use reqwest_client::ReqwestHttpClient;
