use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{
	error::{ErrorBody, Message},
	extract::Json,
};

pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const POST: &str = "Post";
	pub const ENGAGEMENT: &str = "Engagement";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Postboard")
		.summary("Posts, comments and likes behind bearer-token authentication")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Signing up and logging in".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post management".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::ENGAGEMENT.into(),
			description: Some("Comments and likes on posts".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("JWT".into()),
				description: Some("A token returned by signup or login".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<ErrorBody<'static>>, _>(|res| {
			res.example(ErrorBody {
				errors: Message::new("ensure this value has at least 3 characters")
					.field("username")
					.into_vec(),
			})
		})
}
