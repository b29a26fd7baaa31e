//! Helpers over JVM type descriptors such as `(ILjava/lang/String;)V`.

/// Method descriptor with an empty parameter list.
pub fn takes_no_args(descriptor: &str) -> bool {
    descriptor.starts_with("()")
}

/// Return part of a method descriptor, `V` included.
pub fn return_descriptor(descriptor: &str) -> Option<&str> {
    let close = descriptor.find(')')?;
    Some(&descriptor[close + 1..])
}
