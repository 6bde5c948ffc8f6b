use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitStr};

/// 计时宏：在函数返回（或异步future被丢弃）时以 debug 级别记录耗时。
///
/// 通过在函数体开头插入一个 Drop 守卫实现，因此同步/异步函数、
/// 自由函数/方法、带 `?` 的函数体都不需要改写签名。
///
/// 可选参数为日志中显示的名称：`#[timing("load inputs")]`，默认使用函数名。
/// 调用方需要依赖 `log` crate。
#[proc_macro_attribute]
pub fn timing(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);
    let label = if attr.is_empty() {
        input_fn.sig.ident.to_string()
    } else {
        parse_macro_input!(attr as LitStr).value()
    };

    let attrs = &input_fn.attrs; // 原函数属性（如 #[inline]）
    let vis = &input_fn.vis;
    let sig = &input_fn.sig;
    let stmts = &input_fn.block.stmts;

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            struct __TimingGuard(&'static str, ::std::time::Instant);

            impl ::std::ops::Drop for __TimingGuard {
                fn drop(&mut self) {
                    ::log::debug!("Function `{}` executed in {:?}", self.0, self.1.elapsed());
                }
            }

            let __timing_guard = __TimingGuard(#label, ::std::time::Instant::now());
            #(#stmts)*
        }
    };

    TokenStream::from(output)
}
