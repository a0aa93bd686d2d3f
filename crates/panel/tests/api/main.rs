mod api_routes;
mod helpers;
mod recent_page;
mod static_assets;
mod station_page;
