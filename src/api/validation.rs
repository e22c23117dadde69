use super::ApiError;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} id: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_position(position: i32) -> Result<i32, ApiError> {
    if position < 0 {
        return Err(ApiError::validation(format!(
            "Invalid position: {position}. Position must be zero or greater"
        )));
    }
    Ok(position)
}

pub fn validate_way_name(name: &str) -> Result<&str, ApiError> {
    if name.chars().count() > 128 {
        return Err(ApiError::validation(
            "Way name must be 128 characters or less",
        ));
    }
    Ok(name)
}

pub fn validate_transport_name(name: &str) -> Result<&str, ApiError> {
    if name.chars().count() > 32 {
        return Err(ApiError::validation(
            "Transport name must be 32 characters or less",
        ));
    }
    Ok(name)
}
