#[cfg(not(any(feature = "intel-mkl-static", feature = "openblas-static")))]
fn main() {
    // without a static backend we link the system lapack
    println!("cargo:rustc-link-lib=lapack");
}

#[cfg(any(feature = "intel-mkl-static", feature = "openblas-static"))]
fn main() {}
