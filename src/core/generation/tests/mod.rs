mod infographic;
mod post;
