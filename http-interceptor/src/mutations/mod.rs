mod body_replace_mutation;
mod header_mutations;

use crate::{error::Error, middleware::Middleware, RequestBody, RequestData, ResponseData};
use async_trait::async_trait;
use body_replace_mutation::{BodyReplaceMutation, BodyReplaceRegexMutation};
use header_mutations::{RemoveHeadersMutation, RemoveHeadersRegexMutation, SetHeaderMutation};
use regex::Regex;
use std::{collections::HashMap, fmt::Debug};

pub trait BodyMutation: Debug {
    fn mutate(&self, body: &mut String);
}

pub trait HeadersMutation: Debug {
    fn mutate(&self, headers: &mut HashMap<String, String>);
}

#[derive(Debug)]
enum MutationType {
    Body(Box<dyn BodyMutation + Send + Sync>),
    Headers(Box<dyn HeadersMutation + Send + Sync>),
}

/// Which side of the exchange a `MutationMiddleware` rewrites.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MutationTarget {
    Request,
    Response,
    Both,
}

impl MutationTarget {
    fn applies_to_request(self) -> bool {
        self != MutationTarget::Response
    }

    fn applies_to_response(self) -> bool {
        self != MutationTarget::Request
    }
}

/// Applies a fixed list of header and body mutations, in order.
///
/// Body mutations only touch textual request bodies; byte and form bodies are
/// left as they are.
#[derive(Debug)]
pub struct MutationMiddleware {
    target: MutationTarget,
    mutations: Vec<MutationType>,
}

impl MutationMiddleware {
    pub fn builder() -> MutationsBuilder {
        MutationsBuilder::new()
    }

    fn mutate_request(&self, request_data: &mut RequestData) {
        for mutation in &self.mutations {
            match mutation {
                MutationType::Headers(hm) => {
                    hm.mutate(&mut request_data.headers);
                }
                MutationType::Body(bm) => {
                    if let RequestBody::Text(body) = &mut request_data.body {
                        bm.mutate(body);
                    }
                }
            }
        }
    }

    fn mutate_response(&self, response_data: &mut ResponseData) -> Result<(), Error> {
        for mutation in &self.mutations {
            match mutation {
                MutationType::Headers(hm) => {
                    hm.mutate(&mut response_data.headers);
                }
                MutationType::Body(bm) => {
                    let mut body = response_data.body().into_owned();
                    bm.mutate(&mut body);
                    response_data.set_body(&body)?;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Middleware for MutationMiddleware {
    async fn intercept_request(&self, request: &mut RequestData) -> Result<(), Error> {
        if self.target.applies_to_request() {
            self.mutate_request(request);
        }

        Ok(())
    }

    async fn intercept_response(&self, response: &mut ResponseData) -> Result<(), Error> {
        if self.target.applies_to_response() {
            self.mutate_response(response)?;
        }

        Ok(())
    }
}

pub struct MutationsBuilder {
    mutations: Vec<MutationType>,
}

impl MutationsBuilder {
    pub fn new() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }

    pub fn remove_headers<S: Into<String>, I: IntoIterator<Item = S>>(self, headers: I) -> Self {
        self.add_headers_mutation(RemoveHeadersMutation::new(headers))
    }

    pub fn remove_headers_regex<I: IntoIterator<Item = Regex>>(self, patterns: I) -> Self {
        self.add_headers_mutation(RemoveHeadersRegexMutation::new(patterns))
    }

    pub fn add_header<S1: Into<String>, S2: Into<String>>(
        self,
        header_name: S1,
        header_value: S2,
    ) -> Self {
        self.add_headers_mutation(SetHeaderMutation::new(header_name, header_value))
    }

    pub fn body_replace<S1: Into<String>, S2: Into<String>>(self, text: S1, replacement: S2) -> Self {
        self.add_body_mutation(BodyReplaceMutation::new(text, replacement))
    }

    pub fn body_replace_regex<S: Into<String>>(self, pattern: Regex, replacement: S) -> Self {
        self.add_body_mutation(BodyReplaceRegexMutation::new(pattern, replacement))
    }

    pub fn add_headers_mutation<HM: HeadersMutation + Send + Sync + 'static>(
        mut self,
        mutation: HM,
    ) -> Self {
        self.mutations.push(MutationType::Headers(Box::new(mutation)));
        self
    }

    pub fn add_body_mutation<BM: BodyMutation + Send + Sync + 'static>(
        mut self,
        mutation: BM,
    ) -> Self {
        self.mutations.push(MutationType::Body(Box::new(mutation)));
        self
    }

    pub fn build(self, target: MutationTarget) -> MutationMiddleware {
        MutationMiddleware {
            target,
            mutations: self.mutations,
        }
    }
}

impl Default for MutationsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
